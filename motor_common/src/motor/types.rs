//! Plain value types describing a motor: commands, directions, encoder
//! register widths and the status snapshot published every tick.

use bitflags::bitflags;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::consts::INCHES_PER_METER;

// ─── Command ────────────────────────────────────────────────────────

/// Direction command held by a motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Drive with positive speed.
    #[default]
    Forward,
    /// Drive with negative speed.
    Backward,
    /// Ramp down to standstill.
    Stop,
}

impl Command {
    /// Speed multiplier: +1, -1 or 0.
    #[inline]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
            Self::Stop => 0.0,
        }
    }

    /// The opposite travel command. `Stop` has no opposite.
    #[inline]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
            Self::Stop => Self::Stop,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Backward => write!(f, "backward"),
            Self::Stop => write!(f, "stop"),
        }
    }
}

/// Reported travel direction. A stopped motor reports `Forward`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotorDirection {
    /// Positive travel.
    Forward,
    /// Negative travel.
    Backward,
}

impl From<Command> for MotorDirection {
    fn from(command: Command) -> Self {
        match command {
            Command::Backward => Self::Backward,
            Command::Forward | Command::Stop => Self::Forward,
        }
    }
}

// ─── Motor kind ─────────────────────────────────────────────────────

/// What a motor drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MotorKind {
    /// Surface drive (belts, rollers): speed and encoder only.
    #[default]
    Surface,
    /// Linear actuator moving attached items between travel limits.
    Vector,
}

impl fmt::Display for MotorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surface => write!(f, "surface"),
            Self::Vector => write!(f, "vector"),
        }
    }
}

// ─── Limits ─────────────────────────────────────────────────────────

/// Named calibration point on a vector actuator's travel axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationPosition {
    /// The `min` limit.
    #[default]
    Down,
    /// The `mid` limit.
    Middle,
    /// The `max` limit.
    Up,
}

impl FromStr for CalibrationPosition {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "down" => Ok(Self::Down),
            "middle" => Ok(Self::Middle),
            "up" => Ok(Self::Up),
            _ => Err(format!("unknown calibration position: {s:?}")),
        }
    }
}

/// Behaviour when a vector actuator reaches a travel limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LimitPolicy {
    /// Hard stop and snap to the limit.
    #[default]
    Stop,
    /// Reverse early enough that braking ends at the limit.
    Eccentric,
}

// ─── Encoder ────────────────────────────────────────────────────────

/// Unit system an encoder reports in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Pulses per metre of travel.
    #[default]
    Metric,
    /// Readings scaled by inches per metre.
    Imperial,
}

impl UnitSystem {
    /// Multiplier applied when reading the encoder value.
    #[inline]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Metric => 1.0,
            Self::Imperial => INCHES_PER_METER,
        }
    }
}

/// Width and signedness of the encoder pulse register.
///
/// Each variant wraps with its own integer type, so adding a width
/// forces every match below to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegisterWidth {
    /// Unsigned 8-bit (PLC BYTE).
    U8,
    /// Signed 8-bit (PLC SINT).
    I8,
    /// Unsigned 16-bit (PLC WORD).
    U16,
    /// Signed 16-bit (PLC INT).
    I16,
    /// Unsigned 32-bit (PLC DWORD).
    U32,
    /// Signed 32-bit (PLC DINT).
    #[default]
    I32,
}

impl RegisterWidth {
    /// All widths, narrowest first.
    pub const ALL: [Self; 6] = [
        Self::U8,
        Self::I8,
        Self::U16,
        Self::I16,
        Self::U32,
        Self::I32,
    ];

    /// Register size in bits.
    pub const fn bits(self) -> u32 {
        match self {
            Self::U8 | Self::I8 => 8,
            Self::U16 | Self::I16 => 16,
            Self::U32 | Self::I32 => 32,
        }
    }

    /// Smallest representable count.
    pub const fn min(self) -> i64 {
        match self {
            Self::U8 => u8::MIN as i64,
            Self::I8 => i8::MIN as i64,
            Self::U16 => u16::MIN as i64,
            Self::I16 => i16::MIN as i64,
            Self::U32 => u32::MIN as i64,
            Self::I32 => i32::MIN as i64,
        }
    }

    /// Largest representable count.
    pub const fn max(self) -> i64 {
        match self {
            Self::U8 => u8::MAX as i64,
            Self::I8 => i8::MAX as i64,
            Self::U16 => u16::MAX as i64,
            Self::I16 => i16::MAX as i64,
            Self::U32 => u32::MAX as i64,
            Self::I32 => i32::MAX as i64,
        }
    }

    /// Number of distinct counts, `2^bits`.
    pub const fn span(self) -> i64 {
        1_i64 << self.bits()
    }

    /// Two's-complement wrap of an arbitrary count into the register.
    pub const fn wrap(self, count: i64) -> i64 {
        match self {
            Self::U8 => count as u8 as i64,
            Self::I8 => count as i8 as i64,
            Self::U16 => count as u16 as i64,
            Self::I16 => count as i16 as i64,
            Self::U32 => count as u32 as i64,
            Self::I32 => count as i32 as i64,
        }
    }

    /// Fold a fractional pulse count into `[min, min + span)`.
    ///
    /// Values already in range are returned untouched so repeated
    /// folding does not accumulate rounding error.
    pub fn fold(self, pulses: f64) -> f64 {
        let min = self.min() as f64;
        let span = self.span() as f64;
        if pulses >= min && pulses < min + span {
            return pulses;
        }
        (pulses - min).rem_euclid(span) + min
    }
}

impl FromStr for RegisterWidth {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "U8" | "BYTE" => Ok(Self::U8),
            "I8" | "SINT" => Ok(Self::I8),
            "U16" | "WORD" => Ok(Self::U16),
            "I16" | "INT" => Ok(Self::I16),
            "U32" | "DWORD" => Ok(Self::U32),
            "I32" | "DINT" => Ok(Self::I32),
            _ => Err(format!("unknown register width: {s:?}")),
        }
    }
}

// ─── Status ─────────────────────────────────────────────────────────

bitflags! {
    /// Boolean facets of a motor's status.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StatusFlags: u8 {
        /// |speed| above the running epsilon.
        const RUNNING   = 0x01;
        /// Mechanical switch engaged (or not in use).
        const READY     = 0x02;
        /// Ramp armed toward a target.
        const ARMED     = 0x04;
        /// Interlock off: motion held.
        const FROZEN    = 0x08;
        /// Upper boundary signal.
        const LIMIT_MAX = 0x10;
        /// Middle boundary signal.
        const LIMIT_MID = 0x20;
        /// Lower boundary signal.
        const LIMIT_MIN = 0x40;
    }
}

/// Read-only snapshot of one motor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorStatus {
    /// Registry name.
    pub name: String,
    /// Surface or vector.
    pub kind: MotorKind,
    /// Held command.
    pub command: Command,
    /// Reported direction.
    pub direction: MotorDirection,
    /// Signed speed after this tick's ramp step.
    pub current_speed: f64,
    /// Signed speed the ramp is heading for.
    pub target_speed: f64,
    /// Travel along the axis (vector motors; zero otherwise).
    pub distance_traveled: f64,
    /// Encoder reading in pulses (fractional).
    pub encoder_value: f64,
    /// Encoder register content.
    pub encoder_pulses: i64,
    /// Number of times the ramp reached its target.
    pub targets_reached: u64,
    /// Boolean facets.
    pub flags: StatusFlags,
}

impl MotorStatus {
    /// Whether the motor is moving.
    pub fn running(&self) -> bool {
        self.flags.contains(StatusFlags::RUNNING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_signs() {
        assert_eq!(Command::Forward.sign(), 1.0);
        assert_eq!(Command::Backward.sign(), -1.0);
        assert_eq!(Command::Stop.sign(), 0.0);
        assert_eq!(Command::Stop.reversed(), Command::Stop);
        assert_eq!(Command::Forward.reversed(), Command::Backward);
    }

    #[test]
    fn stopped_motor_reports_forward() {
        assert_eq!(MotorDirection::from(Command::Stop), MotorDirection::Forward);
        assert_eq!(
            MotorDirection::from(Command::Backward),
            MotorDirection::Backward
        );
    }

    #[test]
    fn register_bounds() {
        assert_eq!(RegisterWidth::U8.min(), 0);
        assert_eq!(RegisterWidth::U8.max(), 255);
        assert_eq!(RegisterWidth::I8.min(), -128);
        assert_eq!(RegisterWidth::I16.max(), 32_767);
        assert_eq!(RegisterWidth::U32.span(), 4_294_967_296);
        for width in RegisterWidth::ALL {
            assert_eq!(width.max() - width.min() + 1, width.span());
        }
    }

    #[test]
    fn register_wrap_is_twos_complement() {
        assert_eq!(RegisterWidth::U8.wrap(256), 0);
        assert_eq!(RegisterWidth::U8.wrap(-1), 255);
        assert_eq!(RegisterWidth::I8.wrap(128), -128);
        assert_eq!(RegisterWidth::I16.wrap(-32_769), 32_767);
        assert_eq!(RegisterWidth::I32.wrap(i32::MAX as i64 + 1), i32::MIN as i64);
        assert_eq!(RegisterWidth::U32.wrap(-2), u32::MAX as i64 - 1);
    }

    #[test]
    fn register_fold_stays_in_range() {
        assert_eq!(RegisterWidth::U8.fold(12.5), 12.5);
        assert!((RegisterWidth::U8.fold(300.25) - 44.25).abs() < 1e-9);
        assert!((RegisterWidth::I8.fold(-129.0) - 127.0).abs() < 1e-9);
        assert!((RegisterWidth::U16.fold(-1.0) - 65_535.0).abs() < 1e-9);
    }

    #[test]
    fn register_width_parses_plc_names() {
        assert_eq!("DINT".parse::<RegisterWidth>(), Ok(RegisterWidth::I32));
        assert_eq!("byte".parse::<RegisterWidth>(), Ok(RegisterWidth::U8));
        assert_eq!("i16".parse::<RegisterWidth>(), Ok(RegisterWidth::I16));
        assert!("LREAL".parse::<RegisterWidth>().is_err());
    }

    #[test]
    fn imperial_factor() {
        assert_eq!(UnitSystem::Metric.factor(), 1.0);
        assert!((UnitSystem::Imperial.factor() - 39.370_078_740_157_48).abs() < 1e-9);
    }

    #[test]
    fn status_flags_serialize() {
        let status = MotorStatus {
            name: "belt".to_string(),
            kind: MotorKind::Surface,
            command: Command::Forward,
            direction: MotorDirection::Forward,
            current_speed: 0.3,
            target_speed: 0.3,
            distance_traveled: 0.0,
            encoder_value: 0.0,
            encoder_pulses: 0,
            targets_reached: 1,
            flags: StatusFlags::RUNNING | StatusFlags::READY,
        };
        let text = toml::to_string(&status).unwrap();
        let back: MotorStatus = toml::from_str(&text).unwrap();
        assert_eq!(back, status);
        assert!(back.running());
    }
}
