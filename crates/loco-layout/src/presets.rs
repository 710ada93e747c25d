//! Built-in layouts for layout "A".
//!
//! Locomotive 1 runs at speed 10 from station {1, 2}; locomotive 2 runs at
//! speed 12 from station {5, 6}.  Each preset places the shared block(s) at
//! a different distance from the station to exercise the contact-ordering
//! edge cases of the controller (warn contact equal to the station contact,
//! exit contact equal to the station contact, two blocks per lap).

use std::fmt;
use std::str::FromStr;

use loco_core::JunctionSetting as J;

use crate::{Block, Layout, LayoutError, LayoutResult, Route, Station, TrainSpec};

const LAYOUT_A: &str = "A";

/// The shared block right after the station (physical block 1).
const MAIN_BLOCK: u32 = 1;
/// The block right before the station on the two-block preset.
const RETURN_BLOCK: u32 = 2;

/// Named built-in layout.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Preset {
    /// Shared block immediately following the station.
    StationThenBlock,
    /// Short loop: the block starts at the station and ends at it.
    ShortLoop,
    /// Track between the station and the shared block.
    Spaced,
    /// Shared block immediately before the station.
    BlockBeforeStation,
    /// Two independently arbitrated blocks per lap.
    TwoBlocks,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::StationThenBlock,
        Preset::ShortLoop,
        Preset::Spaced,
        Preset::BlockBeforeStation,
        Preset::TwoBlocks,
    ];

    /// Kebab-case name accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Preset::StationThenBlock   => "station-then-block",
            Preset::ShortLoop          => "short-loop",
            Preset::Spaced             => "spaced",
            Preset::BlockBeforeStation => "block-before-station",
            Preset::TwoBlocks          => "two-blocks",
        }
    }

    /// Build the preset.  Presets are known-good, but still go through
    /// [`Layout::new`] validation.
    pub fn layout(self) -> LayoutResult<Layout> {
        let (junctions, a, b) = match self {
            Preset::StationThenBlock => (
                vec![
                    J::diverted(22), J::straight(20), J::diverted(23), J::diverted(16),
                    J::straight(15), J::straight(13), J::straight(10), J::straight(7),
                    J::straight(4),  J::straight(1),  J::diverted(14), J::diverted(9),
                    J::diverted(8),  J::straight(11), J::straight(5),  J::diverted(3),
                    J::diverted(2),
                ],
                vec![Block::new(MAIN_BLOCK, J::straight(21), J::straight(16), 1, 31, 21)],
                vec![Block::new(MAIN_BLOCK, J::diverted(21), J::diverted(16), 5, 34, 24)],
            ),
            Preset::ShortLoop => (
                vec![
                    J::diverted(20), J::diverted(23), J::straight(24), J::straight(6),
                    J::diverted(5),
                ],
                vec![Block::new(MAIN_BLOCK, J::straight(21), J::straight(2), 1, 31, 1)],
                vec![Block::new(MAIN_BLOCK, J::diverted(21), J::diverted(2), 5, 34, 5)],
            ),
            Preset::Spaced => (
                vec![
                    J::diverted(21), J::diverted(20), J::straight(23), J::straight(22),
                    J::straight(19), J::diverted(16), J::straight(17), J::diverted(9),
                    J::straight(11), J::diverted(7),  J::straight(5),  J::straight(4),
                    J::diverted(2),  J::straight(1),
                ],
                vec![Block::new(MAIN_BLOCK, J::straight(15), J::straight(8), 29, 22, 10)],
                vec![Block::new(MAIN_BLOCK, J::diverted(15), J::diverted(8), 33, 25, 14)],
            ),
            Preset::BlockBeforeStation => (
                vec![
                    J::diverted(21), J::diverted(20), J::straight(23), J::straight(22),
                    J::straight(19), J::straight(16), J::straight(17), J::diverted(14),
                    J::straight(13), J::diverted(10), J::straight(11), J::straight(5),
                    J::diverted(3),
                ],
                vec![Block::new(MAIN_BLOCK, J::straight(9), J::straight(2), 19, 13, 1)],
                vec![Block::new(MAIN_BLOCK, J::diverted(9), J::diverted(2), 23, 16, 5)],
            ),
            Preset::TwoBlocks => (
                vec![
                    J::diverted(22), J::straight(20), J::diverted(23), J::diverted(16),
                    J::straight(15), J::straight(13), J::diverted(10), J::diverted(1),
                    J::diverted(14), J::diverted(9),  J::diverted(8),  J::straight(11),
                    J::straight(5),  J::diverted(3),
                ],
                vec![
                    Block::new(MAIN_BLOCK,   J::straight(21), J::straight(16), 1, 31, 21),
                    Block::new(RETURN_BLOCK, J::straight(9),  J::straight(2), 19, 13, 1),
                ],
                vec![
                    Block::new(MAIN_BLOCK,   J::diverted(21), J::diverted(16), 5, 34, 24),
                    Block::new(RETURN_BLOCK, J::diverted(9),  J::diverted(2), 23, 16, 5),
                ],
            ),
        };

        Layout::new(
            LAYOUT_A,
            junctions,
            vec![
                TrainSpec::new(1, 10, Route::new(Station::new(1, 2), a)),
                TrainSpec::new(2, 12, Route::new(Station::new(5, 6), b)),
            ],
        )
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s.trim())
            .ok_or_else(|| LayoutError::Parse(format!("unknown preset {s:?}")))
    }
}
