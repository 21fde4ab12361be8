//! Simulation configuration file.
//!
//! ```toml
//! cycle_time_us = 10000
//! state_file = "motors.state"
//!
//! [shared]
//! service_name = "motor-sim"
//!
//! [[motors]]
//! name = "lift"
//! kind = "vector"
//!
//! [[events]]
//! at = 0.1
//! motor = "lift"
//! signal = "Forward"
//! value = true
//! ```

use motor_common::config::{ConfigError, SharedConfig};
use motor_common::consts::DEFAULT_CYCLE_TIME_US;
use motor_common::io::{SignalDirection, SignalRole, SignalValue};
use motor_common::motor::{MotorCommand, MotorConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

fn default_cycle_time_us() -> u32 {
    DEFAULT_CYCLE_TIME_US
}

/// Whole simulation: motors, timing and scripted events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Logging and service name
    #[serde(default)]
    pub shared: SharedConfig,
    /// Tick length in microseconds
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,
    /// Persisted state file; no persistence when absent
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    /// Motors to build, in order
    #[serde(default)]
    pub motors: Vec<MotorConfig>,
    /// Scripted events
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            cycle_time_us: DEFAULT_CYCLE_TIME_US,
            state_file: None,
            motors: Vec::new(),
            events: Vec::new(),
        }
    }
}

/// One scripted event. Exactly one of `command` or `signal` + `value` is
/// set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioEvent {
    /// Simulation time in seconds
    pub at: f64,
    /// Target motor
    pub motor: String,
    /// Host command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<MotorCommand>,
    /// Input line to drive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<SignalRole>,
    /// Value for `signal`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<SignalValue>,
}

/// What a scenario event does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventAction {
    /// Push a command onto the queue.
    Command(MotorCommand),
    /// Drive an input line.
    Signal(SignalRole, SignalValue),
}

impl ScenarioEvent {
    /// Resolve the action.
    ///
    /// # Errors
    /// `ValidationError` unless exactly one action is given, or if the
    /// signal is not an input.
    pub fn action(&self) -> Result<EventAction, ConfigError> {
        match (self.command, self.signal, self.value) {
            (Some(command), None, None) => Ok(EventAction::Command(command)),
            (None, Some(role), Some(value)) => {
                if role.direction() != SignalDirection::Input {
                    return Err(ConfigError::ValidationError(format!(
                        "event at {}s drives output line {role}",
                        self.at
                    )));
                }
                Ok(EventAction::Signal(role, value))
            }
            _ => Err(ConfigError::ValidationError(format!(
                "event at {}s for '{}' needs either `command` or `signal` + `value`",
                self.at, self.motor
            ))),
        }
    }
}

impl SimulationConfig {
    /// Validate timing, motors and events.
    ///
    /// # Errors
    /// `ValidationError` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.cycle_time_us == 0 {
            return Err(ConfigError::ValidationError(
                "cycle_time_us must be > 0".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for motor in &self.motors {
            if !names.insert(motor.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate motor name: {}",
                    motor.name
                )));
            }
            motor
                .validate()
                .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }

        for event in &self.events {
            if !(event.at >= 0.0) || !event.at.is_finite() {
                return Err(ConfigError::ValidationError(format!(
                    "event time must be >= 0 (got {})",
                    event.at
                )));
            }
            if !names.contains(event.motor.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "event at {}s references unknown motor '{}'",
                    event.at, event.motor
                )));
            }
            event.action()?;
        }
        Ok(())
    }

    /// Tick length in seconds.
    pub fn cycle_time_s(&self) -> f64 {
        f64::from(self.cycle_time_us) / 1_000_000.0
    }

    /// Events ordered by time (stable for equal times).
    pub fn sorted_events(&self) -> Vec<ScenarioEvent> {
        let mut events = self.events.clone();
        events.sort_by(|a, b| a.at.total_cmp(&b.at));
        events
    }
}
