//! Vector motor: an electric motor driving attached items along an axis
//! between calibrated limits.

use glam::DVec3;
use motor_common::io::{SignalBank, SignalRole};
use motor_common::motor::{
    CalibrationPosition, InputEvent, LimitPolicy, MotorConfig, MotorError, MotorKind,
    MotorStatus, StatusFlags,
};
use tracing::{debug, info};

use super::Motor;
use super::drive::{CommandStateMachine, DriveTick};
use super::electric::ElectricMotor;
use super::items::{ItemId, SharedItem};
use super::limits::LimitController;

const LIMIT_ROLES: [SignalRole; 3] = [
    SignalRole::LimitMax,
    SignalRole::LimitMid,
    SignalRole::LimitMin,
];

/// Electric motor with travel limits and attached items.
#[derive(Debug)]
pub struct VectorMotor {
    base: ElectricMotor,
    limits: LimitController,
}

impl VectorMotor {
    /// Build from a validated configuration and calibrate to the default
    /// position.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `config` fails validation.
    pub fn new(config: &MotorConfig) -> Result<Self, MotorError> {
        let mut base = ElectricMotor::new(config)?;
        for role in LIMIT_ROLES {
            base.signals_mut().line(role);
        }
        let limits = LimitController::new(config.limits.clone())?;

        let mut motor = Self { base, limits };
        motor.limits.recalibrate(&mut motor.base.drive);
        motor.publish();
        info!(
            "vector motor '{}' limits max={} mid={} min={} ({:?})",
            motor.base.name(),
            config.limits.max,
            config.limits.mid,
            config.limits.min,
            config.limits.policy
        );
        Ok(motor)
    }

    fn publish(&self) {
        self.base.publish();
        let boundary = self.limits.signals();
        let signals = self.base.signals();
        signals.drive(SignalRole::LimitMax, boundary.max);
        signals.drive(SignalRole::LimitMid, boundary.mid);
        signals.drive(SignalRole::LimitMin, boundary.min);
    }

    /// Stop and full reset: encoder zeroed, items back at the default
    /// position.
    fn full_reset(&mut self) {
        self.limits.recalibrate(&mut self.base.drive);
        self.reset_outputs();
    }

    /// Second half of a reset once the limit controller has recalibrated
    /// (which also hard-stopped the drive).
    fn reset_outputs(&mut self) {
        self.base.encoder.reset();
        self.publish();
    }

    // ─── Calibration ────────────────────────────────────────────────

    /// Hard stop and snap to a calibration point.
    pub fn calibrate(&mut self, position: CalibrationPosition) {
        self.limits.calibrate(&mut self.base.drive, position);
        self.publish();
    }

    // ─── Items ──────────────────────────────────────────────────────

    /// Attach an item moved with gear ratio `gear`.
    ///
    /// # Errors
    /// `UnattachedItem` if the item is not rooted in the scene.
    pub fn attach(&mut self, item: SharedItem, gear: f64) -> Result<bool, MotorError> {
        self.limits.items_mut().attach(item, gear)
    }

    /// Detach an item.
    pub fn remove(&mut self, id: ItemId) -> bool {
        self.limits.items_mut().remove(id)
    }

    /// Detach every item.
    pub fn clear_items(&mut self) {
        self.limits.items_mut().clear();
    }

    // ─── Reconfiguration (each fully resets) ────────────────────────

    /// Replace max/mid/min.
    pub fn set_limits(&mut self, max: f64, mid: f64, min: f64) {
        self.limits.set_limits(&mut self.base.drive, max, mid, min);
        self.reset_outputs();
    }

    /// Set the band half-width.
    ///
    /// # Errors
    /// `InvalidConfiguration` for a negative tolerance.
    pub fn set_tolerance(&mut self, tolerance: f64) -> Result<(), MotorError> {
        self.limits.set_tolerance(&mut self.base.drive, tolerance)?;
        self.reset_outputs();
        Ok(())
    }

    /// Change the limit policy.
    pub fn set_policy(&mut self, policy: LimitPolicy) {
        if self.limits.config().policy == policy {
            return;
        }
        self.limits.set_policy(&mut self.base.drive, policy);
        self.reset_outputs();
    }

    /// Change the travel axis.
    ///
    /// # Errors
    /// `InvalidConfiguration` for a zero or non-finite vector.
    pub fn set_direction(&mut self, direction: DVec3) -> Result<(), MotorError> {
        self.limits.set_direction(&mut self.base.drive, direction)?;
        self.reset_outputs();
        Ok(())
    }

    /// Change the reset position.
    pub fn set_default_position(&mut self, position: CalibrationPosition) {
        self.limits.set_default_position(&mut self.base.drive, position);
        self.reset_outputs();
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// Limit controller.
    pub fn limits(&self) -> &LimitController {
        &self.limits
    }

    /// Travel along the axis.
    pub fn distance(&self) -> f64 {
        self.limits.distance()
    }

    /// Drive, mutable.
    pub fn drive_mut(&mut self) -> &mut CommandStateMachine {
        &mut self.base.drive
    }
}

impl Motor for VectorMotor {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn kind(&self) -> MotorKind {
        self.base.kind()
    }

    fn step(&mut self, dt: f64) {
        if let DriveTick::Moved(speed) = self.base.advance(dt) {
            self.limits.step(&mut self.base.drive, speed, dt);
        }
        self.publish();
    }

    fn start(&mut self) {
        self.base.start();
    }

    fn stop(&mut self) {
        self.base.stop();
    }

    fn forward(&mut self) {
        self.base.forward();
    }

    fn backward(&mut self) {
        self.base.backward();
    }

    fn switch_direction(&mut self) {
        self.base.switch_direction();
    }

    fn stop_break(&mut self) {
        self.base.stop_break();
    }

    fn reset(&mut self) {
        self.full_reset();
        debug!("vector motor '{}' reset", self.base.name());
    }

    fn input(&mut self, event: InputEvent) {
        self.base.input(event);
    }

    fn status(&self) -> MotorStatus {
        let mut status = self.base.status();
        let boundary = self.limits.signals();
        status.distance_traveled = self.limits.distance();
        status.flags.set(StatusFlags::LIMIT_MAX, boundary.max);
        status.flags.set(StatusFlags::LIMIT_MID, boundary.mid);
        status.flags.set(StatusFlags::LIMIT_MIN, boundary.min);
        status
    }

    fn drive(&self) -> &CommandStateMachine {
        self.base.drive()
    }

    fn encoder_value(&self) -> f64 {
        self.base.encoder_value()
    }

    fn signals(&self) -> &SignalBank {
        self.base.signals()
    }

    fn electric(&self) -> &ElectricMotor {
        &self.base
    }

    fn electric_mut(&mut self) -> &mut ElectricMotor {
        &mut self.base
    }

    fn as_vector(&self) -> Option<&VectorMotor> {
        Some(self)
    }

    fn as_vector_mut(&mut self) -> Option<&mut VectorMotor> {
        Some(self)
    }

    fn restore(&mut self, travel: f64, encoder_distance: f64) {
        self.base.encoder.restore(encoder_distance);
        self.limits.restore(travel);
        self.publish();
    }
}

impl Drop for VectorMotor {
    fn drop(&mut self) {
        if !self.limits.items().is_empty() {
            debug!(
                "vector motor '{}' released {} item(s)",
                self.base.name(),
                self.limits.items().len()
            );
        }
        self.limits.items_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::items::tests::make_crate;
    use motor_common::consts::RUNNING_EPSILON;

    fn make_vector(policy: LimitPolicy) -> VectorMotor {
        let mut config = MotorConfig::named("lift", MotorKind::Vector);
        config.base_speed = 0.5;
        config.use_ramp = false;
        config.limits.tolerance = 0.05;
        config.limits.policy = policy;
        VectorMotor::new(&config).unwrap()
    }

    #[test]
    fn test_starts_calibrated_at_default() {
        let motor = make_vector(LimitPolicy::Stop);
        assert_eq!(motor.distance(), 0.0);
        assert!(motor.signals().is_active(SignalRole::LimitMin));
        assert!(!motor.signals().is_active(SignalRole::LimitMax));
    }

    #[test]
    fn test_stop_policy_snaps_and_publishes_max() {
        let mut motor = make_vector(LimitPolicy::Stop);
        let item = make_crate(1);
        motor.attach(item.clone(), 1.0).unwrap();

        motor.forward();
        for _ in 0..300 {
            motor.step(0.01);
        }

        assert_eq!(motor.distance(), 1.0);
        assert!(motor.current_speed().abs() <= RUNNING_EPSILON);
        assert!(motor.signals().is_active(SignalRole::LimitMax));
        assert!(!motor.signals().is_active(SignalRole::Running));
        assert!((item.lock().position.y - 1.0).abs() < 1e-9);
        assert!(motor.status().flags.contains(StatusFlags::LIMIT_MAX));
    }

    #[test]
    fn test_calibrate_cycle_returns_to_zero() {
        let mut motor = make_vector(LimitPolicy::Stop);
        motor.calibrate(CalibrationPosition::Up);
        assert_eq!(motor.distance(), 1.0);
        motor.calibrate(CalibrationPosition::Middle);
        assert_eq!(motor.distance(), 0.5);
        assert!(motor.signals().is_active(SignalRole::LimitMid));
        motor.calibrate(CalibrationPosition::Down);
        assert_eq!(motor.distance(), 0.0);
    }

    #[test]
    fn test_reset_returns_items_and_zeroes_encoder() {
        let mut motor = make_vector(LimitPolicy::Stop);
        let item = make_crate(1);
        motor.attach(item.clone(), 2.0).unwrap();

        motor.forward();
        for _ in 0..50 {
            motor.step(0.01);
        }
        assert!(motor.distance() > 0.0);

        motor.reset();
        motor.step(0.0);
        assert_eq!(motor.current_speed(), 0.0);
        assert_eq!(motor.distance(), 0.0);
        assert_eq!(motor.encoder_value(), 0.0);
        assert!(item.lock().position.y.abs() < 1e-9);
    }

    #[test]
    fn test_eccentric_idle_never_moves() {
        let mut motor = make_vector(LimitPolicy::Eccentric);
        for _ in 0..100 {
            motor.step(0.01);
        }
        assert_eq!(motor.distance(), 0.0);
        assert_eq!(motor.drive().command(), motor_common::motor::Command::Forward);
    }

    #[test]
    fn test_setter_resets() {
        let mut motor = make_vector(LimitPolicy::Stop);
        motor.forward();
        for _ in 0..20 {
            motor.step(0.01);
        }
        motor.set_limits(2.0, 1.0, 0.0);
        assert_eq!(motor.distance(), 0.0);
        assert_eq!(motor.current_speed(), 0.0);
        assert_eq!(motor.encoder_value(), 0.0);
        assert!(motor.set_tolerance(-1.0).is_err());
    }

    #[test]
    fn test_each_setter_calibrates_once() {
        let mut motor = make_vector(LimitPolicy::Stop);
        let mut expected = motor.limits().calibrations();

        motor.set_limits(2.0, 1.0, 0.0);
        expected += 1;
        assert_eq!(motor.limits().calibrations(), expected);

        motor.set_tolerance(0.1).unwrap();
        expected += 1;
        assert_eq!(motor.limits().calibrations(), expected);

        assert!(motor.set_tolerance(-1.0).is_err());
        assert_eq!(motor.limits().calibrations(), expected);

        motor.set_policy(LimitPolicy::Eccentric);
        expected += 1;
        assert_eq!(motor.limits().calibrations(), expected);

        motor.set_policy(LimitPolicy::Eccentric);
        assert_eq!(motor.limits().calibrations(), expected);

        motor.set_direction(DVec3::X).unwrap();
        expected += 1;
        assert_eq!(motor.limits().calibrations(), expected);

        motor.set_default_position(CalibrationPosition::Up);
        expected += 1;
        assert_eq!(motor.limits().calibrations(), expected);
        assert_eq!(motor.distance(), 2.0);

        motor.reset();
        expected += 1;
        assert_eq!(motor.limits().calibrations(), expected);
    }

    #[test]
    fn test_restore_moves_items() {
        let mut motor = make_vector(LimitPolicy::Stop);
        let item = make_crate(3);
        motor.attach(item.clone(), 1.0).unwrap();
        motor.restore(0.5, 0.5);
        assert_eq!(motor.distance(), 0.5);
        assert!((item.lock().position.y - 0.5).abs() < 1e-9);
        assert!((motor.encoder_value() - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_drop_releases_items() {
        let item = make_crate(4);
        {
            let mut motor = make_vector(LimitPolicy::Stop);
            motor.attach(item.clone(), 1.0).unwrap();
            assert_eq!(std::sync::Arc::strong_count(&item), 2);
        }
        assert_eq!(std::sync::Arc::strong_count(&item), 1);
    }
}
