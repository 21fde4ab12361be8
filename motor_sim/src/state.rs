//! Runtime state persistence.
//!
//! Distance traveled and encoder distance are saved per motor on shutdown
//! and re-applied on startup, so vector actuators resume at the position
//! they were left in. State is persisted using bincode.

use motor_common::motor::MotorError;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::registry::MotorRegistry;

/// Persisted state for a single motor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersistedMotorState {
    /// Motor name (for matching on load)
    pub name: String,
    /// Travel along the axis (vector motors; zero otherwise)
    pub distance_traveled: f64,
    /// Encoder distance in metres, already rebased
    pub encoder_distance: f64,
}

/// Persisted state for every motor.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PersistedState {
    /// Version of state format (for migration)
    pub version: u32,
    /// Motor states
    pub motors: Vec<PersistedMotorState>,
    /// Timestamp of last save (Unix epoch seconds)
    pub saved_at: u64,
}

impl PersistedState {
    /// Current state format version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Empty state at the current version.
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            motors: Vec::new(),
            saved_at: 0,
        }
    }

    /// Capture every motor in `registry`.
    pub fn capture(registry: &MotorRegistry) -> Self {
        let motors = registry
            .iter()
            .map(|motor| PersistedMotorState {
                name: motor.name().to_string(),
                distance_traveled: motor.as_vector().map_or(0.0, |v| v.distance()),
                encoder_distance: motor.electric().encoder().total_distance(),
            })
            .collect();
        Self {
            motors,
            ..Self::new()
        }
    }

    /// Re-apply saved distances to matching motors. Returns how many were
    /// restored; entries for unknown motors are skipped.
    pub fn apply(&self, registry: &mut MotorRegistry) -> usize {
        let mut restored = 0;
        for saved in &self.motors {
            match registry.get_mut(&saved.name) {
                Some(motor) => {
                    motor.restore(saved.distance_traveled, saved.encoder_distance);
                    restored += 1;
                }
                None => debug!("no motor '{}' for persisted state, skipped", saved.name),
            }
        }
        restored
    }
}

/// State persistence manager.
#[derive(Debug, Clone)]
pub struct StatePersistence {
    /// Path to state file
    path: PathBuf,
}

impl StatePersistence {
    /// Manager for the state file at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// State file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save state to file, stamping `saved_at`.
    ///
    /// # Errors
    /// `PersistenceError` on I/O or serialization failure.
    pub fn save(&self, state: &PersistedState) -> Result<(), MotorError> {
        debug!("Saving state to {:?}", self.path);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MotorError::PersistenceError(format!("Failed to create directory: {}", e))
            })?;
        }

        let mut state = state.clone();
        state.saved_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let file = File::create(&self.path).map_err(|e| {
            MotorError::PersistenceError(format!("Failed to create state file: {}", e))
        })?;
        bincode::serialize_into(BufWriter::new(file), &state).map_err(|e| {
            MotorError::PersistenceError(format!("Failed to serialize state: {}", e))
        })?;

        info!(
            "Saved state for {} motors to {:?}",
            state.motors.len(),
            self.path
        );
        Ok(())
    }

    /// Load state from file. A missing file or a version mismatch yields
    /// `Ok(None)`.
    ///
    /// # Errors
    /// `PersistenceError` if the file exists but cannot be read or decoded.
    pub fn load(&self) -> Result<Option<PersistedState>, MotorError> {
        debug!("Loading state from {:?}", self.path);

        if !self.path.exists() {
            debug!("State file does not exist, starting fresh");
            return Ok(None);
        }

        let file = File::open(&self.path).map_err(|e| {
            MotorError::PersistenceError(format!("Failed to open state file: {}", e))
        })?;
        let state: PersistedState =
            bincode::deserialize_from(BufReader::new(file)).map_err(|e| {
                warn!("Failed to deserialize state file: {}", e);
                MotorError::PersistenceError(format!("Failed to deserialize state: {}", e))
            })?;

        if state.version != PersistedState::CURRENT_VERSION {
            warn!(
                "State file version {} differs from current {}, starting fresh",
                state.version,
                PersistedState::CURRENT_VERSION
            );
            return Ok(None);
        }

        info!(
            "Loaded state for {} motors from {:?} (saved at {})",
            state.motors.len(),
            self.path,
            state.saved_at
        );
        Ok(Some(state))
    }

    /// Delete the state file if present.
    ///
    /// # Errors
    /// `PersistenceError` if removal fails.
    pub fn delete(&self) -> Result<(), MotorError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                MotorError::PersistenceError(format!("Failed to delete state file: {}", e))
            })?;
            info!("Deleted state file {:?}", self.path);
        }
        Ok(())
    }
}
