//! Motor registry.
//!
//! Owns every motor by unique name, in registration order. Built at
//! startup and handed to [`SimulationCore`](crate::core::SimulationCore)
//! by value; there is no global registry.

use motor_common::motor::{MotorConfig, MotorError};
use tracing::{debug, info};

use crate::motor::{Motor, create_motor};

/// Name → motor map preserving registration order.
#[derive(Default)]
pub struct MotorRegistry {
    motors: Vec<Box<dyn Motor>>,
}

impl std::fmt::Debug for MotorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotorRegistry")
            .field("motors", &self.names())
            .finish()
    }
}

impl MotorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a motor.
    ///
    /// # Errors
    /// `DuplicateMotor` if the name is taken.
    pub fn register(&mut self, motor: Box<dyn Motor>) -> Result<(), MotorError> {
        if self.contains(motor.name()) {
            return Err(MotorError::DuplicateMotor(motor.name().to_string()));
        }
        info!("registered motor '{}' ({})", motor.name(), motor.kind());
        self.motors.push(motor);
        Ok(())
    }

    /// Build a motor from `config` and register it.
    ///
    /// # Errors
    /// `InvalidConfiguration` or `DuplicateMotor`.
    pub fn create(&mut self, config: &MotorConfig) -> Result<(), MotorError> {
        if self.contains(&config.name) {
            return Err(MotorError::DuplicateMotor(config.name.clone()));
        }
        self.register(create_motor(config)?)
    }

    /// Remove and return a motor.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Motor>> {
        let index = self.motors.iter().position(|m| m.name() == name)?;
        debug!("removed motor '{}'", name);
        Some(self.motors.remove(index))
    }

    /// Motor by name.
    pub fn get(&self, name: &str) -> Option<&dyn Motor> {
        self.motors
            .iter()
            .find(|m| m.name() == name)
            .map(|m| m.as_ref())
    }

    /// Motor by name, mutable.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Motor + 'static)> {
        self.motors
            .iter_mut()
            .find(|m| m.name() == name)
            .map(|m| m.as_mut())
    }

    /// Motor by name, or `MotorNotFound`.
    ///
    /// # Errors
    /// `MotorNotFound` if no motor has that name.
    pub fn require_mut(&mut self, name: &str) -> Result<&mut (dyn Motor + 'static), MotorError> {
        self.get_mut(name)
            .ok_or_else(|| MotorError::MotorNotFound(name.to_string()))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.motors.iter().any(|m| m.name() == name)
    }

    /// Registered names in order.
    pub fn names(&self) -> Vec<&str> {
        self.motors.iter().map(|m| m.name()).collect()
    }

    /// First free name of the form `"{prefix} {n}"`, counting from 1.
    pub fn unique_name(&self, prefix: &str) -> String {
        (1..)
            .map(|n| format!("{prefix} {n}"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| prefix.to_string())
    }

    /// All motors.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Motor> {
        self.motors.iter().map(|m| m.as_ref())
    }

    /// All motors, mutable.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Motor>> {
        self.motors.iter_mut()
    }

    /// Number of motors.
    pub fn len(&self) -> usize {
        self.motors.len()
    }

    /// Whether empty.
    pub fn is_empty(&self) -> bool {
        self.motors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motor_common::motor::MotorKind;

    fn make_registry() -> MotorRegistry {
        let mut registry = MotorRegistry::new();
        registry
            .create(&MotorConfig::named("belt", MotorKind::Surface))
            .unwrap();
        registry
            .create(&MotorConfig::named("lift", MotorKind::Vector))
            .unwrap();
        registry
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = make_registry();
        assert_eq!(registry.names(), vec!["belt", "lift"]);
        assert!(registry.get("lift").unwrap().as_vector().is_some());

        registry.get_mut("belt").unwrap().forward();
        assert!(registry.get("belt").unwrap().drive().armed());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = make_registry();
        let result = registry.create(&MotorConfig::named("belt", MotorKind::Vector));
        assert_eq!(result, Err(MotorError::DuplicateMotor("belt".to_string())));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_missing_motor() {
        let mut registry = make_registry();
        assert!(registry.get("nope").is_none());
        assert!(matches!(
            registry.require_mut("nope"),
            Err(MotorError::MotorNotFound(_))
        ));
    }

    #[test]
    fn test_unique_name_skips_taken() {
        let mut registry = MotorRegistry::new();
        assert_eq!(registry.unique_name("Motor"), "Motor 1");

        let name = registry.unique_name("Motor");
        registry
            .create(&MotorConfig::named(name, MotorKind::Surface))
            .unwrap();
        assert_eq!(registry.unique_name("Motor"), "Motor 2");
    }

    #[test]
    fn test_remove() {
        let mut registry = make_registry();
        let removed = registry.remove("belt").unwrap();
        assert_eq!(removed.name(), "belt");
        assert_eq!(registry.names(), vec!["lift"]);
        assert!(registry.remove("belt").is_none());
    }
}
