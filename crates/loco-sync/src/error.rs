//! Coordinator errors.
//!
//! Everything except [`SyncError::ShutDown`] is a protocol violation: a bug in
//! the caller, never a condition to retry.

use loco_core::{BlockId, LocoId};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("{loco} left {block} without holding it (holder: {holder:?})")]
    NotHolding {
        loco:   LocoId,
        block:  BlockId,
        holder: Option<LocoId>,
    },

    #[error("grant for {grant} presented to {block}")]
    ForeignGrant { grant: BlockId, block: BlockId },

    #[error("{loco} requested {block} while already holding it")]
    AlreadyHolding { loco: LocoId, block: BlockId },

    #[error("{loco} contended for {block} while {waiting} was already parked on it")]
    TooManyContenders {
        loco:    LocoId,
        block:   BlockId,
        waiting: LocoId,
    },

    #[error("{loco} arrived at the station of {block} while a rendezvous was resolving")]
    StationOverbooked { loco: LocoId, block: BlockId },

    #[error("{loco} arrived twice at the station of {block}")]
    AlreadyAtStation { loco: LocoId, block: BlockId },

    #[error("no coordinator for {0}")]
    UnknownBlock(BlockId),

    /// The coordinator was shut down while the caller was parked on it.
    #[error("{0} shut down")]
    ShutDown(BlockId),
}

impl SyncError {
    /// `true` for the cooperative-shutdown case, `false` for every protocol
    /// violation.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, SyncError::ShutDown(_))
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
