//! Typed results of `access` and `stop_at_station`.

use loco_core::{BlockId, LocoId, Priority};

/// Proof that `loco` holds `block`.
///
/// Only a [`SharedSection`][crate::SharedSection] can create one, and
/// [`leave`][crate::SharedSection::leave] consumes it, so a block cannot be
/// left twice with the same grant.
#[must_use = "a dropped grant leaves the block held forever"]
#[derive(Debug, PartialEq, Eq)]
pub struct SectionGrant {
    block: BlockId,
    loco:  LocoId,
}

impl SectionGrant {
    pub(crate) fn new(block: BlockId, loco: LocoId) -> Self {
        Self { block, loco }
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    pub fn loco(&self) -> LocoId {
        self.loco
    }
}

/// Outcome of the station rendezvous for one locomotive.
///
/// The last locomotive to arrive leaves with `Priority::High` and already
/// holds the first block (`grant` is `Some`).  The other leaves with
/// `Priority::Normal` and must call `access` like for any block.
#[must_use]
#[derive(Debug)]
pub struct Departure {
    pub priority: Priority,
    pub grant:    Option<SectionGrant>,
}

impl Departure {
    pub(crate) fn high(grant: SectionGrant) -> Self {
        Self { priority: Priority::High, grant: Some(grant) }
    }

    pub(crate) fn normal() -> Self {
        Self { priority: Priority::Normal, grant: None }
    }
}
