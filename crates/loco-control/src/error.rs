use loco_sync::SyncError;
use loco_track::TrackError;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("coordination error: {0}")]
    Sync(#[from] SyncError),

    #[error("track error: {0}")]
    Track(#[from] TrackError),

    /// The [`StopSignal`][crate::StopSignal] was raised between two waits.
    #[error("stop requested")]
    StopRequested,
}

impl ControlError {
    /// `true` when the error only reports a cooperative shutdown (sections
    /// shut down or track closed) rather than a fault.
    pub fn is_shutdown(&self) -> bool {
        match self {
            ControlError::Sync(e) => e.is_shutdown(),
            ControlError::Track(e) => *e == TrackError::Closed,
            ControlError::StopRequested => true,
        }
    }
}

pub type ControlResult<T> = Result<T, ControlError>;
