//! Interfaces the coordination core needs from the track.
//!
//! All of them are shared between the two worker threads, hence the
//! `Send + Sync` bounds and `&self` receivers.

use loco_core::{ContactId, JunctionSetting, LocoId};

use crate::TrackResult;

/// Blocking wait on position events for one locomotive.
pub trait ContactSource: Send + Sync {
    /// Block the calling thread until `contact` fires.
    ///
    /// Returns `Err` only when the track is shutting down or the wait could
    /// never complete.
    fn wait_for_contact(&self, contact: ContactId) -> TrackResult<()>;
}

/// Fire-and-forget junction orientation.
pub trait JunctionActuator: Send + Sync {
    fn set_junction(&self, setting: JunctionSetting);
}

/// Motion primitives of a single locomotive.
pub trait Locomotive: Send + Sync {
    fn id(&self) -> LocoId;

    fn start(&self);

    fn stop(&self);

    fn set_speed(&self, speed: u32);

    /// Place the locomotive between `back` and `front`, heading for `front`.
    fn set_position(&self, front: ContactId, back: ContactId);

    fn lights_on(&self);

    /// Show a short status text for this locomotive.
    fn message(&self, text: &str);
}

/// Whole-layout lifecycle calls.
pub trait LayoutControl: Send + Sync {
    fn select_layout(&self, id: &str);

    fn out_of_service(&self);
}
