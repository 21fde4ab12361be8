//! Motor error type.

use thiserror::Error;

/// Error types for motor operations.
///
/// Stepping never produces one of these; they come from setters,
/// attachment, registry lookups and the command queue.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MotorError {
    /// A setter or config value was rejected; the previous value is kept.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An item not rooted in the scene was offered for attachment.
    #[error("Item {0} is not attached to the scene")]
    UnattachedItem(u64),

    /// No motor registered under that name or id.
    #[error("Motor not found: {0}")]
    MotorNotFound(String),

    /// A motor with that name already exists.
    #[error("Motor already registered: {0}")]
    DuplicateMotor(String),

    /// Operation needs a vector motor.
    #[error("Motor {0} is not a vector motor")]
    NotVector(String),

    /// Command queue is at capacity.
    #[error("Command queue full")]
    QueueFull,

    /// Command queue receiver is gone.
    #[error("Command queue disconnected")]
    QueueDisconnected,

    /// State file could not be written or read.
    #[error("State persistence error: {0}")]
    PersistenceError(String),
}
