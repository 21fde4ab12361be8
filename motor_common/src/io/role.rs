//! Signal roles.
//!
//! `SignalRole` names a motor's I/O line by function (`"Forward"`,
//! `"LimitMax"`, ...). Scenario files and hosts address lines by role
//! rather than by index.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

// ─── Direction / kind ───────────────────────────────────────────────

/// Which side drives the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    /// Host → motor.
    Input,
    /// Motor → host.
    Output,
}

/// Value carried by the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// On/off.
    Bool,
    /// Integer register value.
    Numeric,
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
        }
    }
}

// ─── SignalRole ─────────────────────────────────────────────────────

/// Functional role of a motor signal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalRole {
    // ── Drive inputs ────────────────
    Forward,
    Backward,
    AlternativeSpeed,
    MechanicalSwitch,

    // ── Encoder inputs ──────────────
    EncoderReset,
    EncoderStart,

    // ── Status outputs ──────────────
    Running,
    Ready,

    // ── Vector boundary outputs ─────
    LimitMax,
    LimitMid,
    LimitMin,

    // ── Encoder output ──────────────
    EncoderPulse,
}

impl SignalRole {
    /// Every role in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Forward,
        Self::Backward,
        Self::AlternativeSpeed,
        Self::MechanicalSwitch,
        Self::EncoderReset,
        Self::EncoderStart,
        Self::Running,
        Self::Ready,
        Self::LimitMax,
        Self::LimitMid,
        Self::LimitMin,
        Self::EncoderPulse,
    ];

    /// Whether the host or the motor drives this line.
    pub const fn direction(self) -> SignalDirection {
        match self {
            Self::Forward
            | Self::Backward
            | Self::AlternativeSpeed
            | Self::MechanicalSwitch
            | Self::EncoderReset
            | Self::EncoderStart => SignalDirection::Input,

            Self::Running
            | Self::Ready
            | Self::LimitMax
            | Self::LimitMid
            | Self::LimitMin
            | Self::EncoderPulse => SignalDirection::Output,
        }
    }

    /// Value type carried by the line.
    pub const fn kind(self) -> SignalKind {
        match self {
            Self::EncoderPulse => SignalKind::Numeric,
            _ => SignalKind::Bool,
        }
    }

    /// Only vector motors expose boundary lines.
    pub const fn vector_only(self) -> bool {
        matches!(self, Self::LimitMax | Self::LimitMid | Self::LimitMin)
    }

    /// Dense index, usable for fixed-size tables.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for SignalRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Forward" => Ok(Self::Forward),
            "Backward" => Ok(Self::Backward),
            "AlternativeSpeed" | "AltSpeed" => Ok(Self::AlternativeSpeed),
            "MechanicalSwitch" => Ok(Self::MechanicalSwitch),
            "EncoderReset" => Ok(Self::EncoderReset),
            "EncoderStart" => Ok(Self::EncoderStart),
            "Running" => Ok(Self::Running),
            "Ready" => Ok(Self::Ready),
            "LimitMax" => Ok(Self::LimitMax),
            "LimitMid" => Ok(Self::LimitMid),
            "LimitMin" => Ok(Self::LimitMin),
            "EncoderPulse" => Ok(Self::EncoderPulse),
            _ => Err(format!("unknown signal role: {s:?}")),
        }
    }
}

impl fmt::Display for SignalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Forward => "Forward",
            Self::Backward => "Backward",
            Self::AlternativeSpeed => "AlternativeSpeed",
            Self::MechanicalSwitch => "MechanicalSwitch",
            Self::EncoderReset => "EncoderReset",
            Self::EncoderStart => "EncoderStart",
            Self::Running => "Running",
            Self::Ready => "Ready",
            Self::LimitMax => "LimitMax",
            Self::LimitMid => "LimitMid",
            Self::LimitMin => "LimitMin",
            Self::EncoderPulse => "EncoderPulse",
        };
        f.write_str(name)
    }
}
