//! # Motor Simulation Library
//!
//! Electric motor simulation core: speed ramps, direction logic, encoders
//! and travel limits for conveyor belts and linear actuators.
//!
//! Motors implement the [`Motor`](motor::Motor) trait. Hosts talk to them
//! through signal lines (`motor_common::io`) or by pushing commands onto
//! the queue; the simulation thread applies queued commands and steps
//! every motor once per tick.
//!
//! # Module Structure
//!
//! - [`core`] - SimulationCore struct, tick loop
//! - [`config`] - Simulation configuration file and scripted events
//! - [`motor`] - Motion profile, drive state machine, encoder, limits, motors
//! - [`registry`] - Motor registry
//! - [`queue`] - Bounded command queue
//! - [`io`] - Binding of input lines to the queue
//! - [`state`] - Persisted distances (bincode)
//! - [`error`] - Top-level error type
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        motor_sim                                  │
//! │  ┌──────────────┐   ┌────────────────┐   ┌─────────────────────┐  │
//! │  │ SignalLines  │──►│ CommandQueue   │──►│  SimulationCore     │  │
//! │  │ (any thread) │   │ (crossbeam)    │   │  (tick loop)        │  │
//! │  └──────▲───────┘   └────────────────┘   └──────────┬──────────┘  │
//! │         │                                           │             │
//! │         │ outputs                                   ▼             │
//! │  ┌──────┴──────────────────────────────────────────────────────┐  │
//! │  │ MotorRegistry ─► Motor (trait object)                        │  │
//! │  │   CommandStateMachine ─► MotionProfile                       │  │
//! │  │   Encoder                                                    │  │
//! │  │   LimitController ─► attached items        (vector only)     │  │
//! │  └─────────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod motor;
pub mod queue;
pub mod registry;
pub mod state;

// Re-export key types for convenience
pub use crate::config::SimulationConfig;
pub use crate::core::SimulationCore;
pub use crate::error::SimError;
pub use crate::motor::{Motor, create_motor};
pub use crate::registry::MotorRegistry;
