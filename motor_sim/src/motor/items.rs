//! Items moved by a vector actuator.
//!
//! The host owns its scene objects; the actuator only holds shared handles
//! and pushes additive displacements into them. Only items already rooted
//! in the host's scene may be attached.

use glam::DVec3;
use motor_common::motor::MotorError;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error};

/// Host-assigned identity of a movable item.
pub type ItemId = u64;

/// A scene object the actuator can move.
pub trait Movable: Send {
    /// Stable identity used for duplicate detection.
    fn id(&self) -> ItemId;

    /// Whether the item is part of the scene hierarchy.
    fn is_rooted(&self) -> bool;

    /// Apply an additive displacement in scene coordinates.
    fn translate(&mut self, offset: DVec3);
}

/// Shared handle to a host item.
pub type SharedItem = Arc<Mutex<dyn Movable>>;

#[derive(Clone)]
struct AttachedItem {
    id: ItemId,
    item: SharedItem,
    gear: f64,
}

impl std::fmt::Debug for AttachedItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachedItem")
            .field("id", &self.id)
            .field("gear", &self.gear)
            .finish()
    }
}

/// Set of attached items keyed by identity, each with a gear ratio.
#[derive(Debug, Clone, Default)]
pub struct AttachedItems {
    items: Vec<AttachedItem>,
}

impl AttachedItems {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `item` with displacement multiplier `gear`.
    ///
    /// Attaching an already attached item is ignored and returns `Ok(false)`.
    ///
    /// # Errors
    /// `MotorError::UnattachedItem` if the item is not rooted in the scene.
    pub fn attach(&mut self, item: SharedItem, gear: f64) -> Result<bool, MotorError> {
        let (id, rooted) = {
            let guard = item.lock();
            (guard.id(), guard.is_rooted())
        };

        if !rooted {
            error!("item {} must be added to the scene before attaching", id);
            return Err(MotorError::UnattachedItem(id));
        }
        if self.contains(id) {
            debug!("item {} already attached", id);
            return Ok(false);
        }

        self.items.push(AttachedItem { id, item, gear });
        debug!("item {} attached (gear {})", id, gear);
        Ok(true)
    }

    /// Detach by identity. Returns whether the item was attached.
    pub fn remove(&mut self, id: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|attached| attached.id != id);
        before != self.items.len()
    }

    /// Detach everything.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether `id` is attached.
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.iter().any(|attached| attached.id == id)
    }

    /// Gear ratio of an attached item.
    pub fn gear(&self, id: ItemId) -> Option<f64> {
        self.items
            .iter()
            .find(|attached| attached.id == id)
            .map(|attached| attached.gear)
    }

    /// Number of attached items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Move every item by `distance * gear` along `direction`.
    pub fn displace(&self, direction: DVec3, distance: f64) {
        if distance == 0.0 {
            return;
        }
        for attached in &self.items {
            attached.item.lock().translate(direction * (distance * attached.gear));
        }
    }
}
