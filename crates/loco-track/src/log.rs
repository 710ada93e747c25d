//! Ordered record of everything the simulated track observed.

use loco_core::{ContactId, JunctionSetting, LocoId};
use parking_lot::Mutex;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackEvent {
    LayoutSelected(String),
    OutOfService,
    Junction(JunctionSetting),
    Contact { loco: LocoId, contact: ContactId },
    Started(LocoId),
    Stopped(LocoId),
    Speed { loco: LocoId, speed: u32 },
}

/// Append-only, thread-safe event list.
#[derive(Default)]
pub struct TrackLog {
    events: Mutex<Vec<TrackEvent>>,
}

impl TrackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: TrackEvent) {
        self.events.lock().push(event);
    }

    /// Copy of all events recorded so far, in order.
    pub fn snapshot(&self) -> Vec<TrackEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Contacts fired for `loco`, in order.
    pub fn contacts_of(&self, loco: LocoId) -> Vec<ContactId> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match *e {
                TrackEvent::Contact { loco: l, contact } if l == loco => Some(contact),
                _ => None,
            })
            .collect()
    }
}
