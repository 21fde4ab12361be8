//! Incremental encoder.
//!
//! Integrates travelled distance and reports it as a pulse count wrapped to
//! a PLC register width. Distance is always integrated while the encoder is
//! running; `enabled` only gates emission on the pulse output.
//!
//! The accumulator is a fractional pulse count folded into the register
//! range after every addition; distance in metres is derived on read.
//! Folding is a modular reduction in pulse space, so one large addition
//! and many small ones land on the same count.

use motor_common::consts::ENCODER_POLL_INTERVAL_S;
use motor_common::io::SignalLine;
use motor_common::motor::{EncoderConfig, MotorError, RegisterWidth, UnitSystem};
use tracing::{debug, trace, warn};

/// Distance-to-pulse converter with a 10 ms emission gate.
#[derive(Debug, Clone)]
pub struct Encoder {
    /// Emit on the pulse output
    enabled: bool,
    /// Register the count wraps in
    width: RegisterWidth,
    /// Pulses per metre
    pulses_per_unit: f64,
    /// Unit system applied on read
    unit_system: UnitSystem,
    /// Fractional pulse count, folded into the register range
    count: f64,
    /// Time since last emission
    poll_elapsed: f64,
    /// Accumulating at all (EncoderStart line)
    running: bool,
    /// Pulse output, if wired
    output: Option<SignalLine>,
}

impl Encoder {
    /// New encoder at zero, running.
    pub fn new(config: &EncoderConfig) -> Self {
        Self {
            enabled: config.enabled,
            width: config.width,
            pulses_per_unit: config.pulses_per_unit,
            unit_system: config.unit_system,
            count: 0.0,
            poll_elapsed: 0.0,
            running: true,
            output: None,
        }
    }

    /// Wire the pulse output.
    pub fn with_output(mut self, output: SignalLine) -> Self {
        self.output = Some(output);
        self
    }

    /// Replace (or remove) the pulse output.
    pub fn set_output(&mut self, output: Option<SignalLine>) {
        self.output = output;
    }

    /// Accumulate `delta` metres and fold into the register range.
    pub fn add_distance(&mut self, delta: f64) {
        self.count = self.width.fold(self.count + delta * self.pulses_per_unit);
    }

    /// Advance by `dt` seconds at `speed`.
    ///
    /// Returns `true` when the polling gate elapsed this tick (the reading
    /// is emitted if enabled).
    pub fn step(&mut self, dt: f64, speed: f64) -> bool {
        if !self.running {
            return false;
        }

        self.add_distance(speed * dt);
        self.poll_elapsed += dt;

        if self.poll_elapsed <= ENCODER_POLL_INTERVAL_S {
            return false;
        }
        self.poll_elapsed = 0.0;

        if self.enabled {
            self.emit(self.pulses());
        }
        trace!("encoder poll: value={:.3}", self.value());
        true
    }

    /// Zero distance and polling timer; emits zero if enabled.
    pub fn reset(&mut self) {
        self.count = 0.0;
        self.poll_elapsed = 0.0;
        if self.enabled {
            self.emit(0);
        }
        debug!("encoder reset");
    }

    /// Restore a persisted distance (already folded when saved).
    pub fn restore(&mut self, distance: f64) {
        self.count = self.width.fold(distance * self.pulses_per_unit);
    }

    /// Pulse reading in the configured unit system.
    pub fn value(&self) -> f64 {
        self.count * self.unit_system.factor()
    }

    /// Register content: the reading truncated and wrapped to the width.
    pub fn pulses(&self) -> i64 {
        self.width.wrap(self.value().floor() as i64)
    }

    /// Accumulated (folded) distance in metres.
    pub fn total_distance(&self) -> f64 {
        self.count / self.pulses_per_unit
    }

    /// Start or stop accumulation.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Whether distance is accumulating.
    pub fn running(&self) -> bool {
        self.running
    }

    /// Enable or disable emission.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether readings are emitted.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Set pulses per metre (> 0).
    pub fn set_pulses_per_unit(&mut self, pulses_per_unit: f64) -> Result<(), MotorError> {
        if !(pulses_per_unit > 0.0) || !pulses_per_unit.is_finite() {
            warn!("encoder pulses_per_unit rejected: {}", pulses_per_unit);
            return Err(MotorError::InvalidConfiguration(format!(
                "pulses_per_unit must be > 0 (got {pulses_per_unit})"
            )));
        }
        // Distance is kept; the count is rescaled.
        let distance = self.total_distance();
        self.pulses_per_unit = pulses_per_unit;
        self.count = self.width.fold(distance * pulses_per_unit);
        Ok(())
    }

    /// Pulses per metre.
    pub fn pulses_per_unit(&self) -> f64 {
        self.pulses_per_unit
    }

    /// Change the register width; the count is refolded.
    pub fn set_width(&mut self, width: RegisterWidth) {
        self.width = width;
        self.count = width.fold(self.count);
    }

    /// Register width.
    pub fn width(&self) -> RegisterWidth {
        self.width
    }

    /// Change the reported unit system.
    pub fn set_unit_system(&mut self, unit_system: UnitSystem) {
        self.unit_system = unit_system;
    }

    fn emit(&self, pulses: i64) {
        if let Some(output) = &self.output {
            output.send(pulses);
        }
    }
}
