//! Bounded command queue between signal threads and the simulation tick.
//!
//! Observers on signal lines may fire from any thread. They never touch a
//! motor directly; they push a [`QueuedCommand`] and the simulation thread
//! drains the queue at the start of each tick, so every motor is only ever
//! mutated from one thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};
use heapless::Vec as HVec;
use motor_common::consts::{COMMAND_QUEUE_CAPACITY, MAX_COMMANDS_PER_TICK};
use motor_common::motor::{MotorCommand, MotorError};
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use tracing::warn;

/// A command addressed to a motor by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedCommand {
    /// Target motor
    pub motor: String,
    /// What to do
    pub command: MotorCommand,
}

impl QueuedCommand {
    /// Command for `motor`.
    pub fn new(motor: impl Into<String>, command: impl Into<MotorCommand>) -> Self {
        Self {
            motor: motor.into(),
            command: command.into(),
        }
    }
}

/// Commands drained in one tick.
pub type CommandBatch = HVec<QueuedCommand, MAX_COMMANDS_PER_TICK>;

/// Producer handle. Cheap to clone, usable from any thread.
#[derive(Debug, Clone)]
pub struct CommandSender {
    sender: Sender<QueuedCommand>,
    dropped: Arc<AtomicU64>,
}

impl CommandSender {
    /// Enqueue without blocking.
    ///
    /// # Errors
    /// `QueueFull` when the queue is at capacity, `QueueDisconnected` when
    /// the simulation side is gone.
    pub fn try_send(&self, command: QueuedCommand) -> Result<(), MotorError> {
        self.sender.try_send(command).map_err(|e| match e {
            TrySendError::Full(cmd) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("command queue full, dropped {:?} for '{}'", cmd.command, cmd.motor);
                MotorError::QueueFull
            }
            TrySendError::Disconnected(_) => MotorError::QueueDisconnected,
        })
    }

    /// Number of commands rejected because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

// Observers run on whichever thread drives the line.
assert_impl_all!(CommandSender: Send, Sync, Clone);
assert_impl_all!(QueuedCommand: Send);

/// Consumer side, owned by the simulation core.
#[derive(Debug)]
pub struct CommandQueue {
    sender: CommandSender,
    receiver: Receiver<QueuedCommand>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    /// Queue with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(COMMAND_QUEUE_CAPACITY)
    }

    /// Queue holding at most `capacity` pending commands.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender: CommandSender {
                sender,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            receiver,
        }
    }

    /// New producer handle.
    pub fn sender(&self) -> CommandSender {
        self.sender.clone()
    }

    /// Take up to [`MAX_COMMANDS_PER_TICK`] pending commands in arrival
    /// order. The rest stay queued for the next tick.
    pub fn drain(&self) -> CommandBatch {
        let mut batch = CommandBatch::new();
        while !batch.is_full() {
            match self.receiver.try_recv() {
                Ok(command) => {
                    // Capacity checked by the loop condition.
                    let _ = batch.push(command);
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        batch
    }

    /// Pending commands.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
