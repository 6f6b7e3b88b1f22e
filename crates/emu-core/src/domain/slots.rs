//! Touch slot tracking.
//!
//! A touchscreen exposes a fixed pool of slots; each live finger occupies one
//! slot from touch-down to lift.  Input sources instead hand out ephemeral
//! contact identifiers.  [`SlotTracker`] binds the two:
//!
//! - a new contact takes the lowest free slot,
//! - a contact keeps its slot for its whole lifetime,
//! - a slot is reusable immediately after its contact ends.
//!
//! Every new binding also gets a fresh tracking id so the device can tell a
//! re-used slot apart from the previous finger.

use std::collections::HashMap;

use thiserror::Error;
use tracing::trace;

use crate::protocol::messages::{TouchContact, DEFAULT_SLOT_COUNT};

/// Identifier assigned to a contact by the input source.
pub type ContactId = i64;

/// Index into the device's slot pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u32);

impl Slot {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Local, recoverable tracker conditions.  Callers log and ignore them.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum TrackerError {
    /// Update or end for a contact that was never started (or already ended).
    #[error("unknown touch contact {0}")]
    UnknownContact(ContactId),

    /// Every slot is occupied by a live contact.
    #[error("no free touch slot for contact {contact} ({capacity} slots in use)")]
    NoFreeSlot { contact: ContactId, capacity: usize },
}

#[derive(Debug, Clone, Copy)]
struct LiveContact {
    id: ContactId,
    state: TouchContact,
}

/// Stateful mapping from contact identifiers to device slots.
#[derive(Debug)]
pub struct SlotTracker {
    slots: Vec<Option<LiveContact>>,
    bindings: HashMap<ContactId, Slot>,
    next_tracking_id: i32,
}

impl Default for SlotTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_COUNT)
    }
}

impl SlotTracker {
    /// Creates a tracker with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            bindings: HashMap::with_capacity(capacity),
            next_tracking_id: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live contacts.
    pub fn live_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn slot_of(&self, id: ContactId) -> Option<Slot> {
        self.bindings.get(&id).copied()
    }

    /// Binds `id` to the lowest free slot.
    ///
    /// Starting a contact that is already live returns its existing slot.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NoFreeSlot`] when every slot is in use.
    pub fn on_contact_start(&mut self, id: ContactId) -> Result<Slot, TrackerError> {
        if let Some(slot) = self.slot_of(id) {
            trace!(contact = id, slot = slot.0, "duplicate contact start");
            return Ok(slot);
        }

        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(TrackerError::NoFreeSlot {
                contact: id,
                capacity: self.slots.len(),
            })?;
        let slot = Slot(index as u32);
        let tracking_id = self.allocate_tracking_id();

        self.slots[index] = Some(LiveContact {
            id,
            state: TouchContact {
                slot: slot.0,
                tracking_id,
                ..TouchContact::default()
            },
        });
        self.bindings.insert(id, slot);
        trace!(contact = id, slot = slot.0, tracking_id, "contact bound");
        Ok(slot)
    }

    /// Records the latest position, pressure and radius of a live contact.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownContact`] if `id` is not live; the
    /// tracker is left unchanged.
    pub fn on_contact_update(
        &mut self,
        id: ContactId,
        x: i32,
        y: i32,
        pressure: Option<i16>,
        major_radius: Option<i16>,
    ) -> Result<TouchContact, TrackerError> {
        let live = self.live_mut(id)?;
        live.state.x = x;
        live.state.y = y;
        live.state.pressure = pressure;
        live.state.major_radius = major_radius;
        Ok(live.state)
    }

    /// Releases the slot held by `id`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownContact`] if `id` is not live.
    pub fn on_contact_end(&mut self, id: ContactId) -> Result<Slot, TrackerError> {
        let slot = self
            .bindings
            .remove(&id)
            .ok_or(TrackerError::UnknownContact(id))?;
        self.slots[slot.0 as usize] = None;
        trace!(contact = id, slot = slot.0, "contact released");
        Ok(slot)
    }

    /// All live contacts, ordered by slot ascending.
    pub fn snapshot(&self) -> Vec<TouchContact> {
        self.slots.iter().flatten().map(|live| live.state).collect()
    }

    /// Frees every slot.  Tracking ids keep counting.
    pub fn release_all(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.bindings.clear();
    }

    fn live_mut(&mut self, id: ContactId) -> Result<&mut LiveContact, TrackerError> {
        let slot = self.slot_of(id).ok_or(TrackerError::UnknownContact(id))?;
        self.slots[slot.0 as usize]
            .as_mut()
            .filter(|live| live.id == id)
            .ok_or(TrackerError::UnknownContact(id))
    }

    /// Tracking ids are positive and wrap back to 1.
    fn allocate_tracking_id(&mut self) -> i32 {
        let id = self.next_tracking_id;
        self.next_tracking_id = if id == i32::MAX { 1 } else { id + 1 };
        id
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
