//! Binding of a motor's input lines to the command queue.

use motor_common::io::{SignalDirection, SignalEvent, SignalRole, Subscription};
use motor_common::motor::InputEvent;
use tracing::{debug, trace};

use crate::motor::Motor;
use crate::queue::{CommandSender, QueuedCommand};

/// Input event for a state change on `role`, if `role` is an input.
pub fn input_event(role: SignalRole, active: bool) -> Option<InputEvent> {
    Some(match role {
        SignalRole::Forward => InputEvent::Forward(active),
        SignalRole::Backward => InputEvent::Backward(active),
        SignalRole::AlternativeSpeed => InputEvent::AlternativeSpeed(active),
        SignalRole::MechanicalSwitch => InputEvent::MechanicalSwitch(active),
        SignalRole::EncoderReset => InputEvent::EncoderReset(active),
        SignalRole::EncoderStart => InputEvent::EncoderStart(active),
        _ => return None,
    })
}

/// Live subscriptions forwarding one motor's input lines into the queue.
///
/// Dropping the binding unsubscribes every observer.
#[derive(Debug)]
pub struct IoBinding {
    motor: String,
    subscriptions: Vec<Subscription>,
}

impl IoBinding {
    /// Subscribe to every input line of `motor`.
    pub fn bind(motor: &dyn Motor, sender: &CommandSender) -> Self {
        let name = motor.name().to_string();
        let signals = motor.signals();

        let subscriptions = signals
            .roles()
            .into_iter()
            .filter(|role| role.direction() == SignalDirection::Input)
            .filter_map(|role| signals.get(role).map(|line| (role, line)))
            .map(|(role, line)| {
                let sender = sender.clone();
                let motor = name.clone();
                line.subscribe(move |event| {
                    let active = match event {
                        SignalEvent::On => true,
                        SignalEvent::Off => false,
                        SignalEvent::Value(v) => v != 0,
                    };
                    let Some(input) = input_event(role, active) else {
                        return;
                    };
                    trace!("{}.{} -> {:?}", motor, role, input);
                    // Full/disconnected is already logged by the sender.
                    let _ = sender.try_send(QueuedCommand::new(motor.clone(), input));
                })
            })
            .collect::<Vec<_>>();

        debug!("bound {} input line(s) of '{}'", subscriptions.len(), name);
        Self {
            motor: name,
            subscriptions,
        }
    }

    /// Bound motor.
    pub fn motor(&self) -> &str {
        &self.motor
    }

    /// Number of subscribed lines.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no line is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}
