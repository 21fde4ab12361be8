//! Electric motor: drive, encoder and signal bank.
//!
//! Used directly for surface drives (belts, rollers) and as the core of
//! [`VectorMotor`](super::vector::VectorMotor).

use motor_common::io::{SignalBank, SignalRole};
use motor_common::motor::{
    Command, InputEvent, MotorConfig, MotorError, MotorKind, MotorStatus, StatusFlags,
};
use tracing::{debug, info};

use super::Motor;
use super::drive::{CommandStateMachine, DriveTick};
use super::encoder::Encoder;

/// Roles every electric motor exposes.
pub const ELECTRIC_ROLES: [SignalRole; 9] = [
    SignalRole::Forward,
    SignalRole::Backward,
    SignalRole::AlternativeSpeed,
    SignalRole::MechanicalSwitch,
    SignalRole::EncoderReset,
    SignalRole::EncoderStart,
    SignalRole::Running,
    SignalRole::Ready,
    SignalRole::EncoderPulse,
];

/// Last known state of the direction input lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputLatch {
    /// Forward line
    pub forward: bool,
    /// Backward line
    pub backward: bool,
    /// Alternative-speed line
    pub alternative: bool,
}

/// Electric motor without travel limits.
#[derive(Debug)]
pub struct ElectricMotor {
    /// Registry name
    name: String,
    /// Surface or vector (when used as a vector core)
    kind: MotorKind,
    /// Direction/ramp logic
    pub(crate) drive: CommandStateMachine,
    /// Pulse counter
    pub(crate) encoder: Encoder,
    /// Role → line
    signals: SignalBank,
    /// Input line states seen so far
    inputs: InputLatch,
}

impl ElectricMotor {
    /// Build from a validated configuration.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `config` fails validation.
    pub fn new(config: &MotorConfig) -> Result<Self, MotorError> {
        config.validate()?;

        let signals = SignalBank::with_roles(config.name.clone(), &ELECTRIC_ROLES);
        let encoder = Encoder::new(&config.encoder);
        let mut motor = Self {
            name: config.name.clone(),
            kind: config.kind,
            drive: CommandStateMachine::new(config),
            encoder,
            signals,
            inputs: InputLatch::default(),
        };
        let pulse = motor.signals.line(SignalRole::EncoderPulse);
        motor.encoder.set_output(Some(pulse));
        // The switch starts closed; the host opens it by driving the line off.
        motor.signals.drive(SignalRole::MechanicalSwitch, true);
        motor.publish();

        info!(
            "motor '{}' created ({}, base={} m/s, ramp up={}s down={}s)",
            motor.name, motor.kind, config.base_speed, config.ramp_up, config.ramp_down
        );
        Ok(motor)
    }

    /// Advance drive and encoder; outputs are not yet published.
    pub(crate) fn advance(&mut self, dt: f64) -> DriveTick {
        let tick = self.drive.step(dt);
        if let DriveTick::Moved(speed) = tick {
            self.encoder.step(dt, speed);
        }
        tick
    }

    /// Drive the Running and Ready outputs from the current state.
    pub(crate) fn publish(&self) {
        self.signals.drive(SignalRole::Running, self.drive.running());
        self.signals
            .drive(SignalRole::Ready, self.drive.interlock_engaged());
    }

    /// Signal bank, mutable (vector motors add boundary lines).
    pub(crate) fn signals_mut(&mut self) -> &mut SignalBank {
        &mut self.signals
    }

    /// Drive, mutable, for speed/ramp setters.
    pub fn drive_mut(&mut self) -> &mut CommandStateMachine {
        &mut self.drive
    }

    /// Encoder, for inspection.
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// Encoder, mutable.
    pub fn encoder_mut(&mut self) -> &mut Encoder {
        &mut self.encoder
    }

    /// Input line states seen so far.
    pub fn inputs(&self) -> InputLatch {
        self.inputs
    }

    fn on_direction_input(&mut self, command: Command, active: bool) {
        match command {
            Command::Forward => self.inputs.forward = active,
            Command::Backward => self.inputs.backward = active,
            Command::Stop => {}
        }

        if active {
            if self.drive.command() == command && self.drive.armed() {
                return;
            }
            match command {
                Command::Forward => self.forward(),
                Command::Backward => self.backward(),
                Command::Stop => {}
            }
        } else if !self.inputs.forward && !self.inputs.backward {
            self.stop();
        }
    }
}

impl Motor for ElectricMotor {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> MotorKind {
        self.kind
    }

    fn step(&mut self, dt: f64) {
        self.advance(dt);
        self.publish();
    }

    fn start(&mut self) {
        self.drive.start();
    }

    fn stop(&mut self) {
        self.drive.stop();
    }

    fn forward(&mut self) {
        self.drive.forward();
        if !self.drive.running() {
            self.drive.start();
        }
    }

    fn backward(&mut self) {
        self.drive.backward();
        if !self.drive.running() {
            self.drive.start();
        }
    }

    fn switch_direction(&mut self) {
        self.drive.switch_direction();
    }

    fn stop_break(&mut self) {
        self.drive.stop_break();
        self.publish();
    }

    fn reset(&mut self) {
        self.drive.stop_break();
        self.encoder.reset();
        self.publish();
        debug!("motor '{}' reset", self.name);
    }

    fn input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Forward(active) => self.on_direction_input(Command::Forward, active),
            InputEvent::Backward(active) => self.on_direction_input(Command::Backward, active),
            InputEvent::AlternativeSpeed(active) => {
                self.inputs.alternative = active;
                self.drive.set_alternative(active);
                if self.inputs.forward {
                    self.drive.forward();
                } else if self.inputs.backward {
                    self.drive.backward();
                }
            }
            InputEvent::EncoderReset(true) => self.encoder.reset(),
            InputEvent::EncoderReset(false) => {}
            InputEvent::EncoderStart(active) => self.encoder.set_running(active),
            InputEvent::MechanicalSwitch(on) => {
                self.drive.set_switch(on);
                self.publish();
            }
        }
    }

    fn status(&self) -> MotorStatus {
        let mut flags = StatusFlags::empty();
        flags.set(StatusFlags::RUNNING, self.drive.running());
        flags.set(StatusFlags::READY, self.drive.interlock_engaged());
        flags.set(StatusFlags::ARMED, self.drive.armed());
        flags.set(StatusFlags::FROZEN, !self.drive.interlock_engaged());

        MotorStatus {
            name: self.name.clone(),
            kind: self.kind,
            command: self.drive.command(),
            direction: self.drive.direction(),
            current_speed: self.drive.current_speed(),
            target_speed: self.drive.target_speed(),
            distance_traveled: 0.0,
            encoder_value: self.encoder.value(),
            encoder_pulses: self.encoder.pulses(),
            targets_reached: self.drive.targets_reached(),
            flags,
        }
    }

    fn drive(&self) -> &CommandStateMachine {
        &self.drive
    }

    fn encoder_value(&self) -> f64 {
        self.encoder.value()
    }

    fn signals(&self) -> &SignalBank {
        &self.signals
    }

    fn electric(&self) -> &ElectricMotor {
        self
    }

    fn electric_mut(&mut self) -> &mut ElectricMotor {
        self
    }
}
