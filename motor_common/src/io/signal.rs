//! Signal lines: shared boolean or numeric values with change observers.
//!
//! A `SignalLine` is a cheap cloneable handle. Any clone may `send`; every
//! subscriber is called synchronously on the sending thread, once per
//! actual change. Observers must not block. The simulation core only ever
//! registers observers that enqueue a command.
//!
//! Sends on one line are serialized: the store and the notification run
//! under the line's send lock, so observers see changes in the order the
//! values were stored and the last event always matches `value()`. The
//! lock is re-entrant; an observer may send on its own line, and that
//! nested change is delivered before the outer send finishes.
//!
//! `subscribe` returns a [`Subscription`]; dropping it unregisters the
//! observer, so a motor that goes away cannot be called back.

use parking_lot::{Mutex, ReentrantMutex};
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

use super::role::SignalRole;

// ─── Values & events ────────────────────────────────────────────────

/// Current value of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    /// On/off line.
    Bool(bool),
    /// Register line.
    Int(i64),
}

impl SignalValue {
    /// `true` for an active bool or any non-zero register value.
    pub const fn is_active(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Int(v) => v != 0,
        }
    }
}

impl Default for SignalValue {
    fn default() -> Self {
        Self::Bool(false)
    }
}

impl From<bool> for SignalValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SignalValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Change delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// Bool line switched on.
    On,
    /// Bool line switched off.
    Off,
    /// Register line took a new value.
    Value(i64),
}

impl SignalEvent {
    fn from_value(value: SignalValue) -> Self {
        match value {
            SignalValue::Bool(true) => Self::On,
            SignalValue::Bool(false) => Self::Off,
            SignalValue::Int(v) => Self::Value(v),
        }
    }
}

// ─── SignalLine ─────────────────────────────────────────────────────

type Observer = Arc<dyn Fn(SignalEvent) + Send + Sync>;

struct Inner {
    name: String,
    role: SignalRole,
    value: Mutex<SignalValue>,
    send_lock: ReentrantMutex<()>,
    observers: Mutex<Vec<(u64, Observer)>>,
    next_id: AtomicU64,
}

/// Shared handle to one signal line.
#[derive(Clone)]
pub struct SignalLine {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SignalLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalLine")
            .field("name", &self.inner.name)
            .field("role", &self.inner.role)
            .field("value", &*self.inner.value.lock())
            .finish()
    }
}

impl SignalLine {
    /// New line, initially off (or zero for numeric roles).
    pub fn new(name: impl Into<String>, role: SignalRole) -> Self {
        let initial = match role.kind() {
            super::role::SignalKind::Bool => SignalValue::Bool(false),
            super::role::SignalKind::Numeric => SignalValue::Int(0),
        };
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                role,
                value: Mutex::new(initial),
                send_lock: ReentrantMutex::new(()),
                observers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Line name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Line role.
    pub fn role(&self) -> SignalRole {
        self.inner.role
    }

    /// Current value.
    pub fn value(&self) -> SignalValue {
        *self.inner.value.lock()
    }

    /// Whether the line is on (non-zero).
    pub fn is_active(&self) -> bool {
        self.value().is_active()
    }

    /// Set the value. Observers run only if it changed.
    ///
    /// Returns whether the value changed.
    pub fn send(&self, value: impl Into<SignalValue>) -> bool {
        let value = value.into();
        let _sending = self.inner.send_lock.lock();
        {
            let mut current = self.inner.value.lock();
            if *current == value {
                return false;
            }
            *current = value;
        }

        // Snapshot so observers may subscribe/unsubscribe re-entrantly.
        let observers: Vec<Observer> = self
            .inner
            .observers
            .lock()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        trace!(
            "signal {} = {:?} ({} observers)",
            self.inner.name,
            value,
            observers.len()
        );

        let event = SignalEvent::from_value(value);
        for observer in observers {
            observer(event);
        }
        true
    }

    /// Switch on.
    pub fn on(&self) -> bool {
        self.send(true)
    }

    /// Switch off.
    pub fn off(&self) -> bool {
        self.send(false)
    }

    /// Register an observer for value changes.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(SignalEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.observers.lock().push((id, Arc::new(observer)));
        Subscription {
            line: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.lock().len()
    }
}

assert_impl_all!(SignalLine: Send, Sync, Clone);

// ─── Subscription ───────────────────────────────────────────────────

/// Observer registration; unsubscribes on drop.
#[must_use = "dropping a Subscription unregisters its observer"]
pub struct Subscription {
    line: Weak<Inner>,
    id: u64,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.line.upgrade() {
            inner.observers.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

assert_impl_all!(Subscription: Send, Sync);
