//! Signal lines connecting motors to their host.
//!
//! - [`role`] - `SignalRole` and its direction/kind
//! - [`signal`] - `SignalLine`, `Subscription`
//! - [`bank`] - `SignalBank` (per-motor role → line map)

pub mod bank;
pub mod role;
pub mod signal;

pub use bank::SignalBank;
pub use role::{SignalDirection, SignalKind, SignalRole};
pub use signal::{SignalEvent, SignalLine, SignalValue, Subscription};
