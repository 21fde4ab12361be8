//! Motor models.
//!
//! A motor is a drive state machine plus its encoder and signal lines.
//! Vector motors add a limit controller and carry attached items.
//!
//! ```text
//! CommandStateMachine ── speed ──► Encoder ──► EncoderPulse line
//!         │
//!         └── speed ──► LimitController ──► items + LimitMax/Mid/Min lines
//! ```

pub mod drive;
pub mod electric;
pub mod encoder;
pub mod items;
pub mod limits;
pub mod profile;
pub mod vector;

use motor_common::io::SignalBank;
use motor_common::motor::{
    InputEvent, MotorCommand, MotorConfig, MotorDirection, MotorError, MotorKind, MotorStatus,
};

pub use drive::{CommandStateMachine, DriveTick, RampConfig};
pub use electric::{ElectricMotor, InputLatch};
pub use encoder::Encoder;
pub use items::{AttachedItems, ItemId, Movable, SharedItem};
pub use limits::{BoundarySignals, LimitController, braking_distance};
pub use profile::MotionProfile;
pub use vector::VectorMotor;

/// Common interface of every simulated motor.
///
/// All methods are called from the simulation thread; signal lines are the
/// only part shared with other threads.
pub trait Motor: Send {
    /// Registry name.
    fn name(&self) -> &str;

    /// Surface or vector.
    fn kind(&self) -> MotorKind;

    /// Advance by `dt` seconds and publish outputs.
    fn step(&mut self, dt: f64);

    /// Arm the drive toward the current command's speed.
    fn start(&mut self);

    /// Command stop (ramps down).
    fn stop(&mut self);

    /// Command forward; starts the motor when idle.
    fn forward(&mut self);

    /// Command backward; starts the motor when idle.
    fn backward(&mut self);

    /// Swap forward and backward.
    fn switch_direction(&mut self);

    /// Immediate stop without ramp.
    fn stop_break(&mut self);

    /// Stop and return to the initial state.
    fn reset(&mut self);

    /// React to an input line change.
    fn input(&mut self, event: InputEvent);

    /// Snapshot for status reporting.
    fn status(&self) -> MotorStatus;

    /// Drive state machine.
    fn drive(&self) -> &CommandStateMachine;

    /// Encoder reading in the configured unit system.
    fn encoder_value(&self) -> f64;

    /// Signal lines of this motor.
    fn signals(&self) -> &SignalBank;

    /// Electric core (drive, encoder).
    fn electric(&self) -> &ElectricMotor;

    /// Electric core, mutable, for reconfiguration.
    fn electric_mut(&mut self) -> &mut ElectricMotor;

    /// Downcast to a vector motor.
    fn as_vector(&self) -> Option<&VectorMotor> {
        None
    }

    /// Downcast to a vector motor, mutable.
    fn as_vector_mut(&mut self) -> Option<&mut VectorMotor> {
        None
    }

    /// Current speed in m/s.
    fn current_speed(&self) -> f64 {
        self.drive().current_speed()
    }

    /// Whether the speed is non-zero.
    fn running(&self) -> bool {
        self.drive().running()
    }

    /// Travel direction.
    fn direction(&self) -> MotorDirection {
        self.drive().direction()
    }

    /// Re-apply persisted travel and encoder distance.
    fn restore(&mut self, _travel: f64, encoder_distance: f64) {
        self.electric_mut().encoder_mut().restore(encoder_distance);
    }

    /// Dispatch a host command.
    ///
    /// # Errors
    /// `NotVector` when calibrating a motor without travel limits.
    fn apply(&mut self, command: MotorCommand) -> Result<(), MotorError> {
        match command {
            MotorCommand::Start => self.start(),
            MotorCommand::Stop => self.stop(),
            MotorCommand::Forward => self.forward(),
            MotorCommand::Backward => self.backward(),
            MotorCommand::SwitchDirection => self.switch_direction(),
            MotorCommand::StopBreak => self.stop_break(),
            MotorCommand::Reset => self.reset(),
            MotorCommand::Calibrate(position) => {
                let name = self.name().to_string();
                let vector = self
                    .as_vector_mut()
                    .ok_or(MotorError::NotVector(name))?;
                vector.calibrate(position);
            }
            MotorCommand::Input(event) => self.input(event),
        }
        Ok(())
    }
}

/// Build a motor of the configured kind.
///
/// # Errors
/// `InvalidConfiguration` if the configuration fails validation.
pub fn create_motor(config: &MotorConfig) -> Result<Box<dyn Motor>, MotorError> {
    Ok(match config.kind {
        MotorKind::Surface => Box::new(ElectricMotor::new(config)?),
        MotorKind::Vector => Box::new(VectorMotor::new(config)?),
    })
}
