//! Travel limits and calibration for vector actuators.
//!
//! `LimitController` integrates the drive speed into a travelled distance,
//! pushes the same displacement into every attached item, and maintains
//! the three boundary signals. Each signal has its own band:
//!
//! | Signal | On when                          |
//! |--------|----------------------------------|
//! | max    | `d >= max - tol`                 |
//! | mid    | `mid - tol <= d <= mid + tol`    |
//! | min    | `d <= min + tol`                 |
//!
//! Bands may overlap; more than one signal can be on at once.
//!
//! At a limit the policy decides: `Stop` snaps to the limit with a hard
//! stop, `Eccentric` reverses on the last tick whose reversal ramp still
//! comes to rest short of the limit. The braking distance uses the slope
//! of the reversal itself (current speed to the opposite target over the
//! deceleration window), so the turn point lands within one and a half
//! ticks of travel below the limit and never past it.

use glam::DVec3;
use motor_common::consts::RUNNING_EPSILON;
use motor_common::motor::{CalibrationPosition, Command, LimitConfig, LimitPolicy, MotorError};
use tracing::{debug, trace, warn};

use super::drive::CommandStateMachine;
use super::items::AttachedItems;

/// Boundary signal states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundarySignals {
    /// Upper band
    pub max: bool,
    /// Middle band
    pub mid: bool,
    /// Lower band
    pub min: bool,
}

/// Distance, boundary and calibration logic of a vector actuator.
#[derive(Debug, Clone)]
pub struct LimitController {
    /// Limits; `direction` is kept normalized
    config: LimitConfig,
    /// Travel along the axis
    distance: f64,
    /// Boundary signal states
    signals: BoundarySignals,
    /// Items moved with the actuator
    items: AttachedItems,
    /// Calibrations performed so far
    calibrations: u64,
}

impl LimitController {
    /// New controller at distance zero.
    ///
    /// # Errors
    /// `InvalidConfiguration` for a negative tolerance or zero direction.
    pub fn new(config: LimitConfig) -> Result<Self, MotorError> {
        config.validate()?;
        let config = LimitConfig {
            direction: config.direction.normalize(),
            ..config
        };
        let mut controller = Self {
            config,
            distance: 0.0,
            signals: BoundarySignals::default(),
            items: AttachedItems::new(),
            calibrations: 0,
        };
        controller.update_signals();
        Ok(controller)
    }

    // ─── Tick ───────────────────────────────────────────────────────

    /// Integrate `speed` over `dt` and apply the limit policy.
    ///
    /// Does nothing while the speed is within the running epsilon.
    pub fn step(&mut self, drive: &mut CommandStateMachine, speed: f64, dt: f64) {
        if speed.abs() <= RUNNING_EPSILON {
            return;
        }

        let displacement = speed * dt;
        self.items.displace(self.config.direction, displacement);
        self.distance += displacement;
        self.update_signals();
        trace!("vector distance {:.5}", self.distance);

        match self.config.policy {
            LimitPolicy::Stop => self.apply_stop_policy(drive),
            LimitPolicy::Eccentric => self.apply_eccentric_policy(drive, speed, dt),
        }
    }

    fn apply_stop_policy(&mut self, drive: &mut CommandStateMachine) {
        if self.distance >= self.config.max {
            debug!("max limit reached at {:.5}", self.distance);
            self.calibrate(drive, CalibrationPosition::Up);
        } else if self.distance <= self.config.min {
            debug!("min limit reached at {:.5}", self.distance);
            self.calibrate(drive, CalibrationPosition::Down);
        }
    }

    fn apply_eccentric_policy(&mut self, drive: &mut CommandStateMachine, speed: f64, dt: f64) {
        let braking = braking_distance(speed, drive.reversal_slope());
        // Checked one tick ahead: waiting a tick must not carry the turn
        // point past the limit.
        let stop_at = self.distance + speed * dt + braking;

        let reverse = match drive.command() {
            Command::Forward => stop_at >= self.config.max,
            Command::Backward => stop_at <= self.config.min,
            Command::Stop => false,
        };
        if reverse {
            debug!(
                "eccentric reversal at {:.5} (braking {:.5})",
                self.distance, braking
            );
            drive.switch_direction();
        }
    }

    // ─── Calibration ────────────────────────────────────────────────

    /// Hard stop and snap to a calibration point, moving attached items
    /// back by the overshoot.
    pub fn calibrate(&mut self, drive: &mut CommandStateMachine, position: CalibrationPosition) {
        drive.stop_break();

        let value = self.config.position(position);
        let delta = self.distance - value;
        self.items.displace(self.config.direction, -delta);
        self.distance = value;
        self.update_signals();
        self.calibrations += 1;
        debug!("calibrated to {:?} ({:.5})", position, value);
    }

    /// Calibrate to the configured default position.
    pub fn recalibrate(&mut self, drive: &mut CommandStateMachine) {
        self.calibrate(drive, self.config.default_position);
    }

    /// Jump to `distance`, moving attached items by the difference.
    /// Used to re-apply persisted travel on startup.
    pub fn restore(&mut self, distance: f64) {
        self.items.displace(self.config.direction, distance - self.distance);
        self.distance = distance;
        self.update_signals();
    }

    // ─── Reconfiguration (each recalibrates) ────────────────────────

    /// Replace max/mid/min.
    pub fn set_limits(&mut self, drive: &mut CommandStateMachine, max: f64, mid: f64, min: f64) {
        self.config.max = max;
        self.config.mid = mid;
        self.config.min = min;
        self.recalibrate(drive);
    }

    /// Set the band half-width (>= 0).
    pub fn set_tolerance(
        &mut self,
        drive: &mut CommandStateMachine,
        tolerance: f64,
    ) -> Result<(), MotorError> {
        if !(tolerance >= 0.0) {
            warn!("tolerance rejected: {}", tolerance);
            return Err(MotorError::InvalidConfiguration(format!(
                "tolerance must be >= 0 (got {tolerance})"
            )));
        }
        self.config.tolerance = tolerance;
        self.recalibrate(drive);
        Ok(())
    }

    /// Change the limit policy. Setting the current policy is a no-op.
    pub fn set_policy(&mut self, drive: &mut CommandStateMachine, policy: LimitPolicy) {
        if self.config.policy == policy {
            return;
        }
        self.config.policy = policy;
        self.recalibrate(drive);
    }

    /// Change the travel axis (normalized; must be non-zero).
    ///
    /// Items are first returned along the old axis, then the controller
    /// recalibrates along the new one.
    pub fn set_direction(
        &mut self,
        drive: &mut CommandStateMachine,
        direction: DVec3,
    ) -> Result<(), MotorError> {
        if !direction.is_finite() || direction.length_squared() == 0.0 {
            warn!("travel direction rejected: {}", direction);
            return Err(MotorError::InvalidConfiguration(
                "travel direction must be a non-zero vector".to_string(),
            ));
        }
        let default = self.config.position(self.config.default_position);
        self.items.displace(self.config.direction, default - self.distance);
        self.distance = default;

        self.config.direction = direction.normalize();
        self.recalibrate(drive);
        Ok(())
    }

    /// Change the reset position.
    pub fn set_default_position(
        &mut self,
        drive: &mut CommandStateMachine,
        position: CalibrationPosition,
    ) {
        self.config.default_position = position;
        self.recalibrate(drive);
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// Number of calibrations since construction.
    pub fn calibrations(&self) -> u64 {
        self.calibrations
    }

    /// Travel along the axis.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Boundary signal states.
    pub fn signals(&self) -> BoundarySignals {
        self.signals
    }

    /// Current limits.
    pub fn config(&self) -> &LimitConfig {
        &self.config
    }

    /// Attached items.
    pub fn items(&self) -> &AttachedItems {
        &self.items
    }

    /// Attached items, mutable.
    pub fn items_mut(&mut self) -> &mut AttachedItems {
        &mut self.items
    }

    fn update_signals(&mut self) {
        let d = self.distance;
        let LimitConfig {
            max, mid, min, tolerance, ..
        } = self.config;
        self.signals = BoundarySignals {
            max: d >= max - tolerance,
            mid: d >= mid - tolerance && d <= mid + tolerance,
            min: d <= min + tolerance,
        };
    }
}

/// Signed distance covered while ramping `speed` down to zero.
///
/// `slope` is the deceleration slope (opposite sign to `speed`); `None`
/// means the stop is instant and covers no distance.
pub fn braking_distance(speed: f64, slope: Option<f64>) -> f64 {
    match slope {
        Some(slope) if slope != 0.0 => -(speed * speed) / (2.0 * slope),
        _ => 0.0,
    }
}
