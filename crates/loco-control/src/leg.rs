//! A route block bound to its coordinator.

use std::sync::Arc;

use loco_layout::{Block, Route};
use loco_sync::{SectionRegistry, SharedSection, SyncResult};

/// One step of a lap: the locomotive's own view of a block plus the
/// coordinator shared with the other locomotive.
#[derive(Clone)]
pub struct Leg {
    pub block:   Block,
    pub section: Arc<SharedSection>,
}

/// Resolve every block of `route` against `registry`, in route order.
///
/// # Errors
///
/// [`SyncError::UnknownBlock`][loco_sync::SyncError::UnknownBlock] if a block
/// has no coordinator.
pub fn legs_for(route: &Route, registry: &SectionRegistry) -> SyncResult<Vec<Leg>> {
    route
        .blocks
        .iter()
        .map(|b| Ok(Leg { block: *b, section: registry.get(b.block)? }))
        .collect()
}
