//! Integration test: simulation core end to end.
//!
//! Loads a scenario file, runs it, checks the final status snapshot and
//! the state persisted across restarts.

use std::io::Write;

use motor_common::config::ConfigLoader;
use motor_common::io::SignalRole;
use motor_common::motor::{InputEvent, MotorCommand, MotorStatus, StatusFlags};
use motor_sim::config::SimulationConfig;
use motor_sim::core::SimulationCore;
use motor_sim::queue::QueuedCommand;
use tempfile::{NamedTempFile, tempdir};

// ── Helpers ─────────────────────────────────────────────────────────

const SCENARIO: &str = r#"
cycle_time_us = 10000

[[motors]]
name = "infeed"
base_speed = 0.3
ramp_up = 0.3
ramp_down = 0.3
[motors.encoder]
enabled = true
width = "u16"

[[motors]]
name = "lift"
kind = "vector"
base_speed = 0.5
use_ramp = false
[motors.limits]
max = 1.0
mid = 0.5
min = 0.0
tolerance = 0.05

[[events]]
at = 0.0
motor = "infeed"
signal = "Forward"
value = true

[[events]]
at = 0.0
motor = "lift"
command = "forward"

[[events]]
at = 1.0
motor = "infeed"
signal = "Forward"
value = false
"#;

fn load_scenario() -> SimulationConfig {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{SCENARIO}").unwrap();
    SimulationConfig::load(file.path()).unwrap()
}

fn status<'a>(statuses: &'a [MotorStatus], name: &str) -> &'a MotorStatus {
    statuses.iter().find(|s| s.name == name).unwrap()
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn scenario_runs_to_completion() {
    let mut core = SimulationCore::new(load_scenario()).unwrap();

    core.run(Some(0.5), false);
    let mid_run = core.statuses();
    assert!(status(&mid_run, "infeed").running());
    assert!((status(&mid_run, "infeed").current_speed - 0.3).abs() < 1e-9);

    core.run(Some(3.0), false);
    let statuses = core.statuses();

    let infeed = status(&statuses, "infeed");
    assert!(!infeed.running());
    assert!(infeed.encoder_value > 0.0);

    // 2 s at 0.5 m/s would pass max; the lift parks there instead.
    let lift = status(&statuses, "lift");
    assert_eq!(lift.distance_traveled, 1.0);
    assert!(lift.flags.contains(StatusFlags::LIMIT_MAX));
    assert!(!lift.flags.contains(StatusFlags::RUNNING));
}

#[test]
fn status_serializes_to_json() {
    let mut core = SimulationCore::new(load_scenario()).unwrap();
    core.run(Some(0.2), false);

    let json = serde_json::to_string(&core.statuses()).unwrap();
    let parsed: Vec<MotorStatus> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, core.statuses());
}

#[test]
fn host_threads_feed_the_queue() {
    let mut config = load_scenario();
    config.events.clear();
    let mut core = SimulationCore::new(config).unwrap();

    let sender = core.sender();
    let line = core
        .registry()
        .get("infeed")
        .unwrap()
        .signals()
        .get(SignalRole::Backward)
        .unwrap()
        .clone();

    let host = std::thread::spawn(move || {
        line.on();
        sender
            .try_send(QueuedCommand::new("lift", MotorCommand::Forward))
            .unwrap();
    });
    host.join().unwrap();

    assert_eq!(core.step(0.01), 2);
    assert!(core.registry().get("infeed").unwrap().current_speed() < 0.0);
    assert!(core.registry().get("lift").unwrap().running());
}

#[test]
fn calibrate_on_surface_motor_is_reported_not_fatal() {
    let mut config = load_scenario();
    config.events.clear();
    let mut core = SimulationCore::new(config).unwrap();

    core.sender()
        .try_send(QueuedCommand::new(
            "infeed",
            MotorCommand::Calibrate(motor_common::motor::CalibrationPosition::Up),
        ))
        .unwrap();
    core.sender()
        .try_send(QueuedCommand::new("infeed", InputEvent::Forward(true)))
        .unwrap();

    assert_eq!(core.step(0.01), 2);
    assert!(core.registry().get("infeed").unwrap().running());
}

#[test]
fn state_survives_restart() {
    let dir = tempdir().unwrap();
    let mut config = load_scenario();
    config.state_file = Some(dir.path().join("motors.state"));

    let mut core = SimulationCore::new(config.clone()).unwrap();
    core.run(Some(0.8), false);
    let before = core.statuses();
    core.shutdown().unwrap();

    let restarted = SimulationCore::new(config).unwrap();
    let after = restarted.statuses();

    let lift_before = status(&before, "lift");
    let lift_after = status(&after, "lift");
    assert!((lift_after.distance_traveled - lift_before.distance_traveled).abs() < 1e-12);
    assert!(!lift_after.running());

    let infeed_before = status(&before, "infeed");
    let infeed_after = status(&after, "infeed");
    assert!((infeed_after.encoder_value - infeed_before.encoder_value).abs() < 1e-6);
}
