//! Commands delivered to a motor through the command queue.

use serde::{Deserialize, Serialize};

use super::types::CalibrationPosition;

/// A change on one of a motor's input lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "input", content = "active")]
pub enum InputEvent {
    /// Forward line changed.
    Forward(bool),
    /// Backward line changed.
    Backward(bool),
    /// Alternative-speed line changed.
    AlternativeSpeed(bool),
    /// Encoder reset line changed (resets on rising edge).
    EncoderReset(bool),
    /// Encoder start line changed.
    EncoderStart(bool),
    /// Mechanical switch changed.
    MechanicalSwitch(bool),
}

/// Host-level command for one motor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorCommand {
    /// Run in the held (or inferred) direction.
    Start,
    /// Ramp down.
    Stop,
    /// Select forward, starting if idle.
    Forward,
    /// Select backward, starting if idle.
    Backward,
    /// Swap forward and backward.
    SwitchDirection,
    /// Hard stop.
    StopBreak,
    /// Hard stop, clear encoder, recalibrate.
    Reset,
    /// Snap a vector motor to a calibration point.
    Calibrate(CalibrationPosition),
    /// Input line change.
    Input(InputEvent),
}

impl From<InputEvent> for MotorCommand {
    fn from(event: InputEvent) -> Self {
        Self::Input(event)
    }
}
