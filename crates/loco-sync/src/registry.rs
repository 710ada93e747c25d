//! One coordinator per physical block.

use std::collections::BTreeMap;
use std::sync::Arc;

use loco_core::{BlockId, EventSink, ProtocolConfig};

use crate::{SharedSection, SyncError, SyncResult};

/// All coordinators of a layout, keyed by block.
///
/// Both locomotives' descriptors of a block resolve to the same
/// [`SharedSection`] through this registry.  Sections are created up front and
/// handed out as `Arc`s so they outlive every controller.
pub struct SectionRegistry {
    sections: BTreeMap<BlockId, Arc<SharedSection>>,
}

impl SectionRegistry {
    /// Build one section for every id in `blocks`.  Duplicates are ignored.
    pub fn new(
        blocks: impl IntoIterator<Item = BlockId>,
        config: &ProtocolConfig,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let sections = blocks
            .into_iter()
            .map(|block| (block, Arc::new(SharedSection::new(block, config, Arc::clone(&sink)))))
            .collect();
        Self { sections }
    }

    /// The coordinator for `block`.
    ///
    /// # Errors
    ///
    /// [`SyncError::UnknownBlock`] if the registry was not built with `block`.
    pub fn get(&self, block: BlockId) -> SyncResult<Arc<SharedSection>> {
        self.sections.get(&block).cloned().ok_or(SyncError::UnknownBlock(block))
    }

    /// Shut every section down, waking all parked threads.
    pub fn shutdown_all(&self) {
        for section in self.sections.values() {
            section.shutdown();
        }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Sections in ascending block order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SharedSection>> {
        self.sections.values()
    }
}
