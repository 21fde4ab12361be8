//! Top-level error type of the simulation core and binary.

use motor_common::config::ConfigError;
use motor_common::motor::MotorError;
use thiserror::Error;

/// Errors surfaced by [`SimulationCore`](crate::core::SimulationCore) and
/// the `motor_sim` binary.
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration file or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Motor construction or command error
    #[error(transparent)]
    Motor(#[from] MotorError),

    /// Status output could not be written
    #[error("Failed to write status: {0}")]
    StatusOutput(String),
}
