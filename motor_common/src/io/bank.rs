//! Per-motor signal bank: role → line.
//!
//! Built once per motor. Lines are created lazily the first time a role is
//! requested, so a host that never wires the encoder output simply has no
//! `EncoderPulse` line and emission is skipped.

use std::collections::HashMap;

use super::role::{SignalDirection, SignalRole};
use super::signal::SignalLine;

/// All signal lines belonging to one motor.
#[derive(Debug, Clone, Default)]
pub struct SignalBank {
    owner: String,
    lines: HashMap<SignalRole, SignalLine>,
}

impl SignalBank {
    /// Empty bank for the motor `owner`.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            lines: HashMap::new(),
        }
    }

    /// Bank with a line for every role in `roles`.
    pub fn with_roles(owner: impl Into<String>, roles: &[SignalRole]) -> Self {
        let mut bank = Self::new(owner);
        for role in roles {
            bank.line(*role);
        }
        bank
    }

    /// Motor name used as the line name prefix.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Line for `role`, created on first use.
    pub fn line(&mut self, role: SignalRole) -> SignalLine {
        let owner = &self.owner;
        self.lines
            .entry(role)
            .or_insert_with(|| SignalLine::new(format!("{owner}.{role}"), role))
            .clone()
    }

    /// Line for `role` if it exists.
    pub fn get(&self, role: SignalRole) -> Option<&SignalLine> {
        self.lines.get(&role)
    }

    /// Install an externally created line (e.g. shared between motors).
    pub fn insert(&mut self, line: SignalLine) -> Option<SignalLine> {
        self.lines.insert(line.role(), line)
    }

    /// Drive an output line. Missing lines are skipped silently.
    pub fn drive(&self, role: SignalRole, value: impl Into<super::signal::SignalValue>) {
        if let Some(line) = self.lines.get(&role) {
            line.send(value);
        }
    }

    /// Whether an input line exists and is on.
    pub fn is_active(&self, role: SignalRole) -> bool {
        self.lines.get(&role).is_some_and(SignalLine::is_active)
    }

    /// Roles currently present, inputs then outputs.
    pub fn roles(&self) -> Vec<SignalRole> {
        let mut roles: Vec<SignalRole> = self.lines.keys().copied().collect();
        roles.sort_by_key(|r| (r.direction() == SignalDirection::Output, r.index()));
        roles
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the bank has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
