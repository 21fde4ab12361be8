//! Trapezoidal speed ramp.
//!
//! `MotionProfile` moves the current speed toward a target at a constant
//! slope fixed when the target is armed. The slope is chosen from the
//! ramp-up window when the speed magnitude grows in the same direction and
//! from the ramp-down window otherwise (slowing, stopping, reversing).
//! A zero window on the chosen side steps to the target in one tick.

use motor_common::motor::MotorError;
use tracing::trace;

/// Ramp-speed calculator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionProfile {
    /// Speed after the last step
    current: f64,
    /// Speed being approached
    target: f64,
    /// Signed speed change per second while ramping
    slope: f64,
    /// Chosen ramp window was zero: next step lands on target
    instant: bool,
}

impl MotionProfile {
    /// Profile at standstill.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a new target.
    ///
    /// # Errors
    /// `InvalidConfiguration` if either ramp is negative or not a number;
    /// the profile is left unchanged.
    pub fn set_target(&mut self, target: f64, ramp_up: f64, ramp_down: f64) -> Result<(), MotorError> {
        if !(ramp_up >= 0.0) || !(ramp_down >= 0.0) {
            return Err(MotorError::InvalidConfiguration(format!(
                "ramp windows must be >= 0 (got up={ramp_up}, down={ramp_down})"
            )));
        }
        if !target.is_finite() {
            return Err(MotorError::InvalidConfiguration(format!(
                "target speed must be finite (got {target})"
            )));
        }

        let accelerating = target.abs() > self.current.abs() && target * self.current >= 0.0;
        let ramp = if accelerating { ramp_up } else { ramp_down };

        self.target = target;
        if ramp == 0.0 {
            self.slope = 0.0;
            self.instant = true;
        } else {
            self.slope = (target - self.current) / ramp;
            self.instant = false;
        }

        trace!(
            "profile armed: {:.4} -> {:.4}, slope={:.4}, instant={}",
            self.current, self.target, self.slope, self.instant
        );
        Ok(())
    }

    /// Advance by `dt` seconds and return the new current speed.
    ///
    /// Never steps past the target.
    pub fn step(&mut self, dt: f64) -> f64 {
        if self.instant || self.slope == 0.0 || self.current == self.target {
            self.current = self.target;
            return self.current;
        }

        let before = self.target - self.current;
        let next = self.current + self.slope * dt;
        let after = self.target - next;

        self.current = if after == 0.0 || after.signum() != before.signum() {
            self.target
        } else {
            next
        };
        self.current
    }

    /// Zero the speed and drop any ramp in flight.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Speed after the last step.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Speed being approached.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Signed slope of the ramp in flight (0 when stepping instantly).
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Whether the current speed equals the target.
    pub fn at_target(&self) -> bool {
        self.current == self.target
    }
}
