//! Direction/command state machine.
//!
//! `CommandStateMachine` owns the held [`Command`], the configured speeds
//! and ramp windows, and the [`MotionProfile`] that turns a target speed
//! into a per-tick current speed. It also carries the mechanical-switch
//! interlock: while the switch is off (and honoured), ticks hold the
//! current speed without progressing the ramp.

use motor_common::consts::RUNNING_EPSILON;
use motor_common::motor::{Command, MotorConfig, MotorDirection, MotorError};
use tracing::{debug, trace, warn};

use super::profile::MotionProfile;

/// Ramp windows in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampConfig {
    /// Acceleration window
    pub up: f64,
    /// Deceleration window
    pub down: f64,
    /// Ramp at all
    pub enabled: bool,
}

impl RampConfig {
    /// Windows handed to the profile; disabled ramps step instantly.
    fn windows(&self) -> (f64, f64) {
        if self.enabled {
            (self.up, self.down)
        } else {
            (0.0, 0.0)
        }
    }
}

/// Outcome of one tick of the drive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveTick {
    /// Interlock off: speed held, nothing integrated.
    Frozen,
    /// Ramp advanced; carries the speed to integrate this tick.
    Moved(f64),
}

/// Direction and ramp logic for one motor.
#[derive(Debug, Clone)]
pub struct CommandStateMachine {
    /// Ramp calculator
    profile: MotionProfile,
    /// Ramp windows
    ramp: RampConfig,
    /// Normal speed
    base_speed: f64,
    /// Speed while the alternative-speed latch is on
    alternative_speed: f64,
    /// Alternative-speed latch
    alternative: bool,
    /// Held command
    command: Command,
    /// Last speed with |v| > epsilon
    last_speed: f64,
    /// Ramp armed toward a target
    armed: bool,
    /// Mechanical switch position
    switch_on: bool,
    /// Whether the switch is honoured at all
    switch_enabled: bool,
    /// Number of ramps that reached their target
    targets_reached: u64,
}

impl CommandStateMachine {
    /// Drive at standstill, command `Forward`, switch on.
    pub fn new(config: &MotorConfig) -> Self {
        Self {
            profile: MotionProfile::new(),
            ramp: RampConfig {
                up: config.ramp_up,
                down: config.ramp_down,
                enabled: config.use_ramp && !(config.ramp_up == 0.0 && config.ramp_down == 0.0),
            },
            base_speed: config.base_speed,
            alternative_speed: config.alternative_speed,
            alternative: false,
            command: Command::Forward,
            last_speed: 0.0,
            armed: false,
            switch_on: true,
            switch_enabled: config.mechanical_switch_enabled,
            targets_reached: 0,
        }
    }

    // ─── Commands ───────────────────────────────────────────────────

    /// Hold `Forward`; retarget if moving.
    pub fn forward(&mut self) {
        self.set_command(Command::Forward);
    }

    /// Hold `Backward`; retarget if moving.
    pub fn backward(&mut self) {
        self.set_command(Command::Backward);
    }

    /// Hold `Stop`; ramp down if moving.
    pub fn stop(&mut self) {
        self.set_command(Command::Stop);
    }

    /// Swap `Forward` and `Backward`. No-op while `Stop` is held.
    pub fn switch_direction(&mut self) {
        match self.command {
            Command::Forward => self.backward(),
            Command::Backward => self.forward(),
            Command::Stop => {}
        }
    }

    /// Arm the ramp toward the held direction.
    ///
    /// With `Stop` held the direction is inferred from the last non-zero
    /// speed (`Forward` if the motor never moved). Refused while the
    /// interlock is off.
    pub fn start(&mut self) {
        if !self.interlock_engaged() {
            debug!("start refused: mechanical switch off");
            return;
        }
        if self.command == Command::Stop {
            self.command = if self.last_speed >= 0.0 {
                Command::Forward
            } else {
                Command::Backward
            };
        }
        self.arm();
    }

    /// Hard stop: speed and ramp zeroed now, command back to `Forward`.
    pub fn stop_break(&mut self) {
        self.profile.reset();
        self.armed = false;
        self.command = Command::Forward;
        debug!("stop break");
    }

    // ─── Tick ───────────────────────────────────────────────────────

    /// Advance the ramp by `dt` seconds.
    pub fn step(&mut self, dt: f64) -> DriveTick {
        if !self.interlock_engaged() {
            trace!("drive frozen at {:.4}", self.profile.current());
            return DriveTick::Frozen;
        }

        let speed = if self.armed {
            let speed = self.profile.step(dt);
            if self.profile.at_target() {
                self.armed = false;
                self.targets_reached += 1;
                debug!("target speed {:.4} reached", speed);
            }
            speed
        } else {
            self.profile.current()
        };

        if speed.abs() > RUNNING_EPSILON {
            self.last_speed = speed;
        }
        DriveTick::Moved(speed)
    }

    // ─── Settings ───────────────────────────────────────────────────

    /// Set the normal speed (> 0).
    pub fn set_base_speed(&mut self, speed: f64) -> Result<(), MotorError> {
        positive("base speed", speed)?;
        self.base_speed = speed;
        self.retarget_if_moving();
        Ok(())
    }

    /// Set the alternative speed (> 0).
    pub fn set_alternative_speed(&mut self, speed: f64) -> Result<(), MotorError> {
        positive("alternative speed", speed)?;
        self.alternative_speed = speed;
        self.retarget_if_moving();
        Ok(())
    }

    /// Set the acceleration window (>= 0).
    ///
    /// Setting zero while the deceleration window is also zero disables
    /// ramping instead and keeps the stored window.
    pub fn set_ramp_up(&mut self, seconds: f64) -> Result<(), MotorError> {
        if seconds == 0.0 && self.ramp.down == 0.0 {
            self.set_use_ramp(false);
            return Ok(());
        }
        non_negative("ramp up", seconds)?;
        self.ramp.up = seconds;
        Ok(())
    }

    /// Set the deceleration window (>= 0). See [`Self::set_ramp_up`].
    pub fn set_ramp_down(&mut self, seconds: f64) -> Result<(), MotorError> {
        if seconds == 0.0 && self.ramp.up == 0.0 {
            self.set_use_ramp(false);
            return Ok(());
        }
        non_negative("ramp down", seconds)?;
        self.ramp.down = seconds;
        Ok(())
    }

    /// Enable or disable ramping.
    pub fn set_use_ramp(&mut self, enabled: bool) {
        self.ramp.enabled = enabled;
    }

    /// Latch the alternative-speed selection. Takes effect on the next
    /// command that computes a target.
    pub fn set_alternative(&mut self, active: bool) {
        self.alternative = active;
    }

    /// Honour (or ignore) the mechanical switch.
    pub fn set_switch_enabled(&mut self, enabled: bool) {
        self.switch_enabled = enabled;
    }

    /// Move the mechanical switch.
    pub fn set_switch(&mut self, on: bool) {
        if self.switch_on != on {
            debug!("mechanical switch {}", if on { "on" } else { "off" });
        }
        self.switch_on = on;
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// Whether |speed| exceeds the running epsilon.
    pub fn running(&self) -> bool {
        self.profile.current().abs() > RUNNING_EPSILON
    }

    /// Current signed speed.
    pub fn current_speed(&self) -> f64 {
        self.profile.current()
    }

    /// Target signed speed.
    pub fn target_speed(&self) -> f64 {
        self.profile.target()
    }

    /// Held command.
    pub fn command(&self) -> Command {
        self.command
    }

    /// Reported direction (`Stop` reports `Forward`).
    pub fn direction(&self) -> MotorDirection {
        self.command.into()
    }

    /// Last speed with |v| above the epsilon.
    pub fn last_speed(&self) -> f64 {
        self.last_speed
    }

    /// Whether a ramp is in flight.
    pub fn armed(&self) -> bool {
        self.armed
    }

    /// Whether motion may progress (switch on or not honoured).
    pub fn interlock_engaged(&self) -> bool {
        !self.switch_enabled || self.switch_on
    }

    /// Whether the mechanical switch is honoured.
    pub fn switch_enabled(&self) -> bool {
        self.switch_enabled
    }

    /// Alternative-speed latch.
    pub fn alternative(&self) -> bool {
        self.alternative
    }

    /// Ramp windows.
    pub fn ramp(&self) -> RampConfig {
        self.ramp
    }

    /// Normal speed.
    pub fn base_speed(&self) -> f64 {
        self.base_speed
    }

    /// Alternative speed.
    pub fn alternative_speed(&self) -> f64 {
        self.alternative_speed
    }

    /// Number of ramps that reached their target.
    pub fn targets_reached(&self) -> u64 {
        self.targets_reached
    }

    /// Slope the ramp would take if the held direction were switched
    /// now; `None` when that is instant, the motor is at rest or the
    /// switch would not slow the motor down.
    pub fn reversal_slope(&self) -> Option<f64> {
        let (_, down) = self.ramp.windows();
        let v = self.profile.current();
        if down == 0.0 || v.abs() <= RUNNING_EPSILON {
            return None;
        }
        let target = -self.command.sign() * self.command_speed();
        let slope = (target - v) / down;
        (slope * v < 0.0).then_some(slope)
    }

    // ─── Internals ──────────────────────────────────────────────────

    fn set_command(&mut self, command: Command) {
        if self.command != command {
            debug!("command {} -> {}", self.command, command);
        }
        self.command = command;
        self.retarget_if_moving();
    }

    fn retarget_if_moving(&mut self) {
        if self.running() || self.armed {
            self.arm();
        }
    }

    fn command_speed(&self) -> f64 {
        if self.alternative {
            self.alternative_speed
        } else {
            self.base_speed
        }
    }

    fn arm(&mut self) {
        let target = self.command_speed() * self.command.sign();
        let (up, down) = self.ramp.windows();
        match self.profile.set_target(target, up, down) {
            Ok(()) => self.armed = true,
            Err(e) => warn!("target {:.4} rejected: {}", target, e),
        }
    }
}

fn positive(what: &str, value: f64) -> Result<(), MotorError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        warn!("{} rejected: must be > 0 (got {})", what, value);
        Err(MotorError::InvalidConfiguration(format!(
            "{what} must be > 0 (got {value})"
        )))
    }
}

fn non_negative(what: &str, value: f64) -> Result<(), MotorError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        warn!("{} rejected: must be >= 0 (got {})", what, value);
        Err(MotorError::InvalidConfiguration(format!(
            "{what} must be >= 0 (got {value})"
        )))
    }
}
