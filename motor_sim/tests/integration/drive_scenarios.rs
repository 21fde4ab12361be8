//! Integration test: surface motor drive scenarios.
//!
//! 1. Ramp from rest to base speed, then hard stop
//! 2. Reset followed by a zero-length step
//! 3. Mechanical switch freezes and resumes motion
//! 4. Input lines drive the motor through the queue

use motor_common::io::SignalRole;
use motor_common::motor::{Command, InputEvent, MotorConfig, MotorKind, StatusFlags};
use motor_sim::motor::{ElectricMotor, Motor, create_motor};

// ── Helpers ─────────────────────────────────────────────────────────

fn make_belt() -> Box<dyn Motor> {
    let mut config = MotorConfig::named("belt", MotorKind::Surface);
    config.base_speed = 0.3;
    config.ramp_up = 0.3;
    config.ramp_down = 0.3;
    config.encoder.enabled = true;
    create_motor(&config).unwrap()
}

fn run(motor: &mut dyn Motor, dt: f64, steps: usize) {
    for _ in 0..steps {
        motor.step(dt);
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn forward_from_rest_reaches_base_speed() {
    let mut motor = make_belt();
    motor.forward();
    run(motor.as_mut(), 0.03, 10);

    assert!((motor.current_speed() - 0.3).abs() < 1e-9);
    assert!(motor.running());

    motor.stop_break();
    assert_eq!(motor.current_speed(), 0.0);
    assert!(!motor.running());
    assert_eq!(motor.drive().command(), Command::Forward);
}

#[test]
fn half_ramp_is_half_speed() {
    let mut motor = make_belt();
    motor.forward();
    run(motor.as_mut(), 0.03, 5);
    assert!((motor.current_speed() - 0.15).abs() < 1e-9);
}

#[test]
fn stop_right_after_start_is_honoured() {
    let mut motor = make_belt();
    motor.forward();
    motor.stop();
    run(motor.as_mut(), 0.03, 3);
    assert!(!motor.running());
    assert_eq!(motor.drive().command(), Command::Stop);
}

#[test]
fn reverse_while_running_ramps_through_zero() {
    let mut motor = make_belt();
    motor.forward();
    run(motor.as_mut(), 0.03, 11);

    motor.backward();
    // 0.6 m/s of change over the ramp-down window of 0.3 s
    run(motor.as_mut(), 0.03, 5);
    assert!((motor.current_speed() - 0.0).abs() < 1e-9);
    run(motor.as_mut(), 0.03, 6);
    assert!((motor.current_speed() + 0.3).abs() < 1e-9);
}

#[test]
fn start_after_stop_resumes_last_direction() {
    let mut motor = make_belt();
    motor.backward();
    run(motor.as_mut(), 0.03, 11);
    motor.stop();
    run(motor.as_mut(), 0.03, 11);
    assert!(!motor.running());

    motor.start();
    assert_eq!(motor.drive().command(), Command::Backward);
    run(motor.as_mut(), 0.03, 2);
    assert!(motor.current_speed() < 0.0);
}

#[test]
fn reset_then_zero_step_is_all_zero() {
    let mut motor = make_belt();
    motor.forward();
    run(motor.as_mut(), 0.01, 80);
    assert!(motor.encoder_value() > 0.0);

    motor.reset();
    motor.step(0.0);

    let status = motor.status();
    assert_eq!(status.current_speed, 0.0);
    assert_eq!(status.distance_traveled, 0.0);
    assert_eq!(status.encoder_pulses, 0);
    assert!(!status.running());
}

#[test]
fn mechanical_switch_freezes_then_resumes() {
    let mut config = MotorConfig::named("belt", MotorKind::Surface);
    config.mechanical_switch_enabled = true;
    let mut motor = ElectricMotor::new(&config).unwrap();

    motor.forward();
    run(&mut motor, 0.03, 4);
    let held = motor.current_speed();

    motor.input(InputEvent::MechanicalSwitch(false));
    run(&mut motor, 0.03, 10);
    assert_eq!(motor.current_speed(), held);
    assert!(motor.status().flags.contains(StatusFlags::FROZEN));

    // A start request while open is refused; target memory is kept.
    motor.start();
    assert!(!motor.signals().is_active(SignalRole::Ready));

    motor.input(InputEvent::MechanicalSwitch(true));
    run(&mut motor, 0.03, 10);
    assert!((motor.current_speed() - 0.3).abs() < 1e-9);
}

#[test]
fn switch_ignored_when_not_enabled() {
    let mut motor = make_belt();
    motor.forward();
    motor.input(InputEvent::MechanicalSwitch(false));
    run(motor.as_mut(), 0.03, 11);
    assert!((motor.current_speed() - 0.3).abs() < 1e-9);
}

#[test]
fn alternative_speed_while_running() {
    let mut motor = make_belt();
    motor.input(InputEvent::Backward(true));
    run(motor.as_mut(), 0.03, 11);
    assert!((motor.current_speed() + 0.3).abs() < 1e-9);

    motor.input(InputEvent::AlternativeSpeed(true));
    run(motor.as_mut(), 0.03, 11);
    assert!((motor.current_speed() + 0.1).abs() < 1e-9);
    assert!(motor.signals().is_active(SignalRole::Running));
}

#[test]
fn targets_reached_are_counted() {
    let mut motor = make_belt();
    motor.forward();
    run(motor.as_mut(), 0.03, 12);
    motor.stop();
    run(motor.as_mut(), 0.03, 12);
    assert_eq!(motor.status().targets_reached, 2);
}
