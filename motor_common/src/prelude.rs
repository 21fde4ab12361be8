//! Prelude module for common re-exports.
//!
//! ```rust
//! use motor_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{
    DEFAULT_CYCLE_TIME_US, ENCODER_POLL_INTERVAL_S, MAX_COMMANDS_PER_TICK, RUNNING_EPSILON,
};

// ─── Motor ──────────────────────────────────────────────────────────
pub use crate::motor::{
    CalibrationPosition, Command, EncoderConfig, InputEvent, LimitConfig, LimitPolicy,
    MotorCommand, MotorConfig, MotorDirection, MotorError, MotorKind, MotorStatus, RegisterWidth,
    StatusFlags, UnitSystem,
};

// ─── I/O ────────────────────────────────────────────────────────────
pub use crate::io::{SignalBank, SignalEvent, SignalLine, SignalRole, SignalValue, Subscription};
