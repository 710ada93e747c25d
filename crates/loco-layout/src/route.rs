//! Routes: a station plus the ordered blocks of one lap.

use std::collections::HashSet;

use loco_core::{ContactId, LocoId};

use crate::{Block, LayoutError, LayoutResult, Station};

/// The cyclic path a single locomotive runs, lap after lap.
///
/// Routes are static: no path planning happens at run time.  The first block
/// is special because its coordinator also hosts the station rendezvous.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub station: Station,
    pub blocks:  Vec<Block>,
}

impl Route {
    pub fn new(station: Station, blocks: Vec<Block>) -> Self {
        Self { station, blocks }
    }

    /// The contact the controller treats as "at the station".
    #[inline]
    pub fn station_contact(&self) -> ContactId {
        self.station.front
    }

    /// First block of the lap, if any.
    #[inline]
    pub fn first_block(&self) -> Option<&Block> {
        self.blocks.first()
    }

    /// Last block of the lap, if any.
    #[inline]
    pub fn last_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Check the route is usable by `loco`: at least one block, and no
    /// physical block visited twice per lap (the second `access` would
    /// contend with the locomotive's own hold).
    pub fn validate(&self, loco: LocoId) -> LayoutResult<()> {
        if self.blocks.is_empty() {
            return Err(LayoutError::EmptyRoute(loco));
        }
        let mut seen = HashSet::with_capacity(self.blocks.len());
        for b in &self.blocks {
            if !seen.insert(b.block) {
                return Err(LayoutError::RepeatedBlock { loco, block: b.block });
            }
        }
        Ok(())
    }

    /// The cyclic sequence of contacts a locomotive physically passes on
    /// this route, starting with the station contact.
    ///
    /// Consecutive duplicates are collapsed (a warn contact that is also the
    /// station contact is passed once), as is a final contact equal to the
    /// first one.
    pub fn contact_circuit(&self) -> Vec<ContactId> {
        let mut circuit = vec![self.station.front];
        for b in &self.blocks {
            for contact in [b.warn, b.enter, b.exit] {
                if circuit.last() != Some(&contact) {
                    circuit.push(contact);
                }
            }
        }
        if circuit.len() > 1 && circuit.last() == circuit.first() {
            circuit.pop();
        }
        circuit
    }
}
