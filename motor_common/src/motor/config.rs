//! Persisted motor configuration.
//!
//! Speeds are in metres per second, ramps in seconds, limits in metres
//! along the travel direction.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::error::MotorError;
use super::types::{CalibrationPosition, LimitPolicy, MotorKind, RegisterWidth, UnitSystem};

fn default_base_speed() -> f64 {
    0.3
}

fn default_alternative_speed() -> f64 {
    0.1
}

fn default_ramp() -> f64 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_pulses_per_unit() -> f64 {
    1000.0
}

fn default_max() -> f64 {
    1.0
}

fn default_mid() -> f64 {
    0.5
}

fn default_tolerance() -> f64 {
    0.01
}

fn default_direction() -> DVec3 {
    DVec3::Y
}

/// Configuration of one motor.
///
/// ```toml
/// [[motors]]
/// name = "lift"
/// kind = "vector"
/// base_speed = 0.3
/// ramp_up = 0.3
///
/// [motors.limits]
/// max = 1.0
/// policy = "eccentric"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MotorConfig {
    /// Unique motor name.
    pub name: String,
    /// Surface or vector drive.
    #[serde(default)]
    pub kind: MotorKind,
    /// Normal running speed (m/s, > 0).
    #[serde(default = "default_base_speed")]
    pub base_speed: f64,
    /// Speed used while the alternative-speed line is on (m/s, > 0).
    #[serde(default = "default_alternative_speed")]
    pub alternative_speed: f64,
    /// Seconds to accelerate from standstill to target.
    #[serde(default = "default_ramp")]
    pub ramp_up: f64,
    /// Seconds to decelerate to standstill.
    #[serde(default = "default_ramp")]
    pub ramp_down: f64,
    /// Ramp speed changes instead of stepping.
    #[serde(default = "default_true")]
    pub use_ramp: bool,
    /// Honour the mechanical-switch interlock.
    #[serde(default)]
    pub mechanical_switch_enabled: bool,
    /// Encoder settings.
    #[serde(default)]
    pub encoder: EncoderConfig,
    /// Travel limits (vector motors only).
    #[serde(default)]
    pub limits: LimitConfig,
}

impl MotorConfig {
    /// Default configuration for a motor called `name`.
    pub fn named(name: impl Into<String>, kind: MotorKind) -> Self {
        Self {
            name: name.into(),
            kind,
            base_speed: default_base_speed(),
            alternative_speed: default_alternative_speed(),
            ramp_up: default_ramp(),
            ramp_down: default_ramp(),
            use_ramp: true,
            mechanical_switch_enabled: false,
            encoder: EncoderConfig::default(),
            limits: LimitConfig::default(),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// `MotorError::InvalidConfiguration` naming the first offending field.
    pub fn validate(&self) -> Result<(), MotorError> {
        if self.name.trim().is_empty() {
            return Err(MotorError::InvalidConfiguration(
                "motor name cannot be empty".to_string(),
            ));
        }
        if !(self.base_speed > 0.0) {
            return Err(MotorError::InvalidConfiguration(format!(
                "{}: base_speed must be > 0 (got {})",
                self.name, self.base_speed
            )));
        }
        if !(self.alternative_speed > 0.0) {
            return Err(MotorError::InvalidConfiguration(format!(
                "{}: alternative_speed must be > 0 (got {})",
                self.name, self.alternative_speed
            )));
        }
        if !(self.ramp_up >= 0.0) || !(self.ramp_down >= 0.0) {
            return Err(MotorError::InvalidConfiguration(format!(
                "{}: ramps must be >= 0 (got up={}, down={})",
                self.name, self.ramp_up, self.ramp_down
            )));
        }
        self.encoder
            .validate()
            .map_err(|e| prefix_error(&self.name, e))?;
        if self.kind == MotorKind::Vector {
            self.limits
                .validate()
                .map_err(|e| prefix_error(&self.name, e))?;
        }
        Ok(())
    }
}

fn prefix_error(name: &str, err: MotorError) -> MotorError {
    match err {
        MotorError::InvalidConfiguration(msg) => {
            MotorError::InvalidConfiguration(format!("{name}: {msg}"))
        }
        other => other,
    }
}

/// Encoder configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EncoderConfig {
    /// Emit readings on the pulse output.
    #[serde(default)]
    pub enabled: bool,
    /// Register width the count wraps in.
    #[serde(default)]
    pub width: RegisterWidth,
    /// Pulses per metre of travel (> 0).
    #[serde(default = "default_pulses_per_unit")]
    pub pulses_per_unit: f64,
    /// Reported unit system.
    #[serde(default)]
    pub unit_system: UnitSystem,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            width: RegisterWidth::default(),
            pulses_per_unit: default_pulses_per_unit(),
            unit_system: UnitSystem::default(),
        }
    }
}

impl EncoderConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), MotorError> {
        if !(self.pulses_per_unit > 0.0) || !self.pulses_per_unit.is_finite() {
            return Err(MotorError::InvalidConfiguration(format!(
                "encoder pulses_per_unit must be > 0 (got {})",
                self.pulses_per_unit
            )));
        }
        Ok(())
    }
}

/// Travel limits of a vector actuator.
///
/// `min <= mid <= max` is assumed and not checked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LimitConfig {
    /// Upper travel limit.
    #[serde(default = "default_max")]
    pub max: f64,
    /// Middle calibration point.
    #[serde(default = "default_mid")]
    pub mid: f64,
    /// Lower travel limit.
    #[serde(default)]
    pub min: f64,
    /// Half-width of the boundary signal bands (>= 0).
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// What happens at a limit.
    #[serde(default)]
    pub policy: LimitPolicy,
    /// Travel axis in scene coordinates; normalized on use.
    #[serde(default = "default_direction")]
    pub direction: DVec3,
    /// Position taken on reset.
    #[serde(default)]
    pub default_position: CalibrationPosition,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max: default_max(),
            mid: default_mid(),
            min: 0.0,
            tolerance: default_tolerance(),
            policy: LimitPolicy::default(),
            direction: default_direction(),
            default_position: CalibrationPosition::default(),
        }
    }
}

impl LimitConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), MotorError> {
        if !(self.tolerance >= 0.0) {
            return Err(MotorError::InvalidConfiguration(format!(
                "limit tolerance must be >= 0 (got {})",
                self.tolerance
            )));
        }
        if !self.direction.is_finite() || self.direction.length_squared() == 0.0 {
            return Err(MotorError::InvalidConfiguration(
                "travel direction must be a non-zero vector".to_string(),
            ));
        }
        Ok(())
    }

    /// Distance along the axis of a calibration point.
    pub fn position(&self, position: CalibrationPosition) -> f64 {
        match position {
            CalibrationPosition::Down => self.min,
            CalibrationPosition::Middle => self.mid,
            CalibrationPosition::Up => self.max,
        }
    }
}
