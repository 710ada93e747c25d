//! Validated two-train layout configuration.

use std::collections::BTreeSet;

use loco_core::{BlockId, JunctionSetting, LocoId};

use crate::{LayoutError, LayoutResult, Route};

/// A locomotive together with its route and cruising speed.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainSpec {
    pub loco:  LocoId,
    pub speed: u32,
    pub route: Route,
}

impl TrainSpec {
    pub fn new(loco: u32, speed: u32, route: Route) -> Self {
        Self { loco: LocoId(loco), speed, route }
    }
}

/// Everything needed to start a run: which physical layout to select, the
/// junction positions to apply before the trains move, and the two trains.
///
/// Construct with [`Layout::new`], which enforces the invariants the
/// coordination protocol relies on.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Layout {
    id:        String,
    junctions: Vec<JunctionSetting>,
    trains:    Vec<TrainSpec>,
}

impl Layout {
    /// Validate and build a layout.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::TrainCount`] unless exactly two trains are given.
    /// - [`LayoutError::DuplicateLoco`] if both trains use the same loco.
    /// - [`LayoutError::EmptyRoute`] / [`LayoutError::RepeatedBlock`] from
    ///   [`Route::validate`].
    /// - [`LayoutError::StationMismatch`] if the routes do not start with
    ///   the same physical block; that block's coordinator hosts the station
    ///   rendezvous, so both trains must meet there.
    pub fn new(
        id:        impl Into<String>,
        junctions: Vec<JunctionSetting>,
        trains:    Vec<TrainSpec>,
    ) -> LayoutResult<Self> {
        if trains.len() != 2 {
            return Err(LayoutError::TrainCount(trains.len()));
        }
        if trains[0].loco == trains[1].loco {
            return Err(LayoutError::DuplicateLoco(trains[0].loco));
        }
        for t in &trains {
            t.route.validate(t.loco)?;
        }

        // validate() guarantees both routes have a first block.
        let first  = trains[0].route.blocks[0].block;
        let second = trains[1].route.blocks[0].block;
        if first != second {
            return Err(LayoutError::StationMismatch { first, second });
        }

        Ok(Self { id: id.into(), junctions, trains })
    }

    /// Identifier of the physical layout to select (e.g. `"A"`).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Junction positions applied once before the trains start.
    pub fn junctions(&self) -> &[JunctionSetting] {
        &self.junctions
    }

    /// The two trains, in configuration order.
    pub fn trains(&self) -> &[TrainSpec] {
        &self.trains
    }

    /// Every physical block used by either route, sorted.
    pub fn block_ids(&self) -> Vec<BlockId> {
        let set: BTreeSet<BlockId> = self
            .trains
            .iter()
            .flat_map(|t| t.route.blocks.iter().map(|b| b.block))
            .collect();
        set.into_iter().collect()
    }
}
