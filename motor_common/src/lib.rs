//! Motor Common Library
//!
//! Shared types for the motor simulation workspace: configuration loading,
//! motor configuration/command/status types, and the signal lines a host
//! uses to talk to a motor.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Workspace-wide numeric constants
//! - [`motor`] - Motor configuration, commands, status, errors
//! - [`io`] - Signal lines, roles and per-motor banks
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use motor_common::prelude::*;
//!
//! let config = MotorConfig::named("belt", MotorKind::Surface);
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod consts;
pub mod io;
pub mod motor;
pub mod prelude;
