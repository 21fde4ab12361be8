//! Motor configuration, command and status types shared by the
//! simulation core and its hosts.

pub mod command;
pub mod config;
pub mod error;
pub mod types;

pub use command::{InputEvent, MotorCommand};
pub use config::{EncoderConfig, LimitConfig, MotorConfig};
pub use error::MotorError;
pub use types::{
    CalibrationPosition, Command, LimitPolicy, MotorDirection, MotorKind, MotorStatus,
    RegisterWidth, StatusFlags, UnitSystem,
};
