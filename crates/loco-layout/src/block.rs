//! Shared-section descriptors and stations.

use loco_core::{BlockId, ContactId, JunctionSetting};

/// The two contacts a locomotive sits between when stopped at its station.
///
/// `front` is the contact the controller waits on; `back` is only used to
/// place the locomotive at startup.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Station {
    pub front: ContactId,
    pub back:  ContactId,
}

impl Station {
    #[inline]
    pub const fn new(front: u32, back: u32) -> Self {
        Self { front: ContactId(front), back: ContactId(back) }
    }
}

/// One locomotive's view of a shared block.
///
/// The physical block is identified by `block`; each locomotive carries its
/// own descriptor because it enters through different contacts and needs the
/// junctions thrown its own way.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    pub block: BlockId,

    /// Junction at the block entry, thrown once the locomotive is on `enter`.
    pub entry_junction: JunctionSetting,

    /// Junction at the block exit, thrown right after `entry_junction`.
    pub exit_junction: JunctionSetting,

    /// Contact at which the locomotive asks for the block.
    pub warn: ContactId,

    /// Contact marking the physical block entry.
    pub enter: ContactId,

    /// Contact past which the block is free again.
    pub exit: ContactId,
}

impl Block {
    pub const fn new(
        block:          u32,
        entry_junction: JunctionSetting,
        exit_junction:  JunctionSetting,
        warn:           u32,
        enter:          u32,
        exit:           u32,
    ) -> Self {
        Self {
            block: BlockId(block),
            entry_junction,
            exit_junction,
            warn:  ContactId(warn),
            enter: ContactId(enter),
            exit:  ContactId(exit),
        }
    }
}
