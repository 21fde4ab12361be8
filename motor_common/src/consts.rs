//! Numeric constants shared by every motor crate.
//!
//! Single source of truth; nothing here is redefined elsewhere.

/// Speeds with a magnitude at or below this are treated as standstill.
pub const RUNNING_EPSILON: f64 = 1e-9;

/// Encoder polling gate in seconds (10 ms).
pub const ENCODER_POLL_INTERVAL_S: f64 = 0.010;

/// Inches per metre, used for imperial encoder readings.
pub const INCHES_PER_METER: f64 = 1000.0 / 25.4;

/// Default simulation cycle time in microseconds (100 Hz).
pub const DEFAULT_CYCLE_TIME_US: u32 = 10_000;

/// Upper bound on queued commands applied in one tick.
pub const MAX_COMMANDS_PER_TICK: usize = 64;

/// Capacity of the bounded command queue between signal lines and the core.
pub const COMMAND_QUEUE_CAPACITY: usize = 256;
