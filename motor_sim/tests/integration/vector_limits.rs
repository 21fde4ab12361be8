//! Integration test: vector motor limits and calibration.
//!
//! Validates the limit lifecycle of a linear actuator:
//! 1. Stop policy snaps to the limit and hard-stops
//! 2. Calibration sequences land exactly on the configured values
//! 3. Eccentric policy bounces before the limit and never at rest
//! 4. Attached items follow every displacement, scaled by gear

use std::sync::Arc;

use glam::DVec3;
use motor_common::io::SignalRole;
use motor_common::motor::{
    CalibrationPosition, Command, LimitPolicy, MotorConfig, MotorKind, StatusFlags,
};
use motor_sim::motor::{ItemId, Motor, Movable, VectorMotor};
use parking_lot::Mutex;

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Debug)]
struct Pallet {
    id: ItemId,
    position: DVec3,
}

impl Movable for Pallet {
    fn id(&self) -> ItemId {
        self.id
    }

    fn is_rooted(&self) -> bool {
        true
    }

    fn translate(&mut self, offset: DVec3) {
        self.position += offset;
    }
}

fn make_pallet(id: ItemId) -> Arc<Mutex<Pallet>> {
    Arc::new(Mutex::new(Pallet {
        id,
        position: DVec3::ZERO,
    }))
}

fn make_lift(policy: LimitPolicy, use_ramp: bool) -> VectorMotor {
    let mut config = MotorConfig::named("lift", MotorKind::Vector);
    config.base_speed = 0.5;
    config.use_ramp = use_ramp;
    config.ramp_up = 0.3;
    config.ramp_down = 0.3;
    config.limits.max = 1.0;
    config.limits.mid = 0.5;
    config.limits.min = 0.0;
    config.limits.tolerance = 0.05;
    config.limits.policy = policy;
    VectorMotor::new(&config).unwrap()
}

fn run(motor: &mut VectorMotor, dt: f64, steps: usize) {
    for _ in 0..steps {
        motor.step(dt);
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn stop_policy_snaps_exactly_to_max() {
    let mut lift = make_lift(LimitPolicy::Stop, false);
    lift.forward();
    run(&mut lift, 0.007, 400);

    assert_eq!(lift.distance(), 1.0);
    assert_eq!(lift.drive().command(), Command::Forward);
    assert!(!lift.running());
    assert!(lift.signals().is_active(SignalRole::LimitMax));
    assert!(!lift.signals().is_active(SignalRole::LimitMin));
}

#[test]
fn stop_policy_snaps_exactly_to_min() {
    let mut lift = make_lift(LimitPolicy::Stop, false);
    lift.calibrate(CalibrationPosition::Middle);
    lift.backward();
    run(&mut lift, 0.007, 400);

    assert_eq!(lift.distance(), 0.0);
    assert!(lift.signals().is_active(SignalRole::LimitMin));
}

#[test]
fn calibrate_up_down_up_is_exact() {
    let mut lift = make_lift(LimitPolicy::Stop, true);
    lift.forward();
    run(&mut lift, 0.013, 37);

    lift.calibrate(CalibrationPosition::Up);
    lift.calibrate(CalibrationPosition::Down);
    lift.calibrate(CalibrationPosition::Up);
    assert_eq!(lift.distance(), 1.0);
    assert!(lift.status().flags.contains(StatusFlags::LIMIT_MAX));
}

#[test]
fn calibrate_moves_items_back_by_overshoot() {
    let mut lift = make_lift(LimitPolicy::Stop, false);
    let near = make_pallet(1);
    let far = make_pallet(2);
    lift.attach(near.clone(), 1.0).unwrap();
    lift.attach(far.clone(), 3.0).unwrap();

    lift.forward();
    run(&mut lift, 0.01, 50);
    lift.calibrate(CalibrationPosition::Middle);

    assert!((near.lock().position.y - 0.5).abs() < 1e-9);
    assert!((far.lock().position.y - 1.5).abs() < 1e-9);
}

#[test]
fn eccentric_never_reverses_at_rest() {
    let mut lift = make_lift(LimitPolicy::Eccentric, true);
    lift.calibrate(CalibrationPosition::Up);
    run(&mut lift, 0.01, 200);

    assert_eq!(lift.distance(), 1.0);
    assert_eq!(lift.drive().command(), Command::Forward);
    assert!(!lift.running());
}

#[test]
fn eccentric_bounces_between_limits() {
    let mut lift = make_lift(LimitPolicy::Eccentric, true);
    lift.forward();

    let mut max_seen = f64::MIN;
    let mut reversals = 0;
    let mut last = lift.drive().command();
    for _ in 0..2000 {
        lift.step(0.005);
        max_seen = max_seen.max(lift.distance());
        if lift.drive().command() != last {
            reversals += 1;
            last = lift.drive().command();
        }
    }

    assert!(reversals >= 2);
    // Turn points land just short of either limit.
    assert!(max_seen < 1.0, "max {max_seen}");
    assert!(max_seen > 1.0 - 1.5 * 0.5 * 0.005 - 1e-9, "max {max_seen}");
    assert!(lift.distance() > 0.0);
}

#[test]
fn reset_returns_to_default_position() {
    let mut config = MotorConfig::named("lift", MotorKind::Vector);
    config.limits.default_position = CalibrationPosition::Middle;
    let mut lift = VectorMotor::new(&config).unwrap();
    let pallet = make_pallet(9);
    lift.attach(pallet.clone(), 1.0).unwrap();
    assert_eq!(lift.distance(), 0.5);

    lift.forward();
    run(&mut lift, 0.01, 100);
    lift.reset();
    lift.step(0.0);

    assert_eq!(lift.distance(), 0.5);
    assert_eq!(lift.current_speed(), 0.0);
    assert_eq!(lift.encoder_value(), 0.0);
    assert!(pallet.lock().position.y.abs() < 1e-9);
}

#[test]
fn direction_change_moves_along_new_axis() {
    let mut lift = make_lift(LimitPolicy::Stop, false);
    let pallet = make_pallet(5);
    lift.attach(pallet.clone(), 1.0).unwrap();

    lift.set_direction(DVec3::new(2.0, 0.0, 0.0)).unwrap();
    lift.forward();
    run(&mut lift, 0.01, 20);

    let position = pallet.lock().position;
    assert!((position.x - 0.1).abs() < 1e-9);
    assert!(position.y.abs() < 1e-9);
    assert!(lift.set_direction(DVec3::ZERO).is_err());
}

#[test]
fn boundary_bands_overlap_when_tolerance_is_wide() {
    let mut lift = make_lift(LimitPolicy::Stop, false);
    lift.set_tolerance(1.0).unwrap();

    let signals = lift.signals();
    assert!(signals.is_active(SignalRole::LimitMin));
    assert!(signals.is_active(SignalRole::LimitMid));
    assert!(signals.is_active(SignalRole::LimitMax));
}
