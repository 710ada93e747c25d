use loco_core::{ContactId, LocoId};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TrackError {
    /// The track was shut down while a thread was waiting on it.
    #[error("track closed")]
    Closed,

    #[error("{0} is not on the track")]
    UnknownLoco(LocoId),

    /// Waiting for a contact the locomotive never passes would stall forever.
    #[error("{contact} is not on the circuit of {loco}")]
    NotOnCircuit { loco: LocoId, contact: ContactId },
}

pub type TrackResult<T> = Result<T, TrackError>;
