//! Departure priority assigned at the station rendezvous.

use std::fmt;

use crate::CoreError;

/// Departure rank of a locomotive for the current lap.
///
/// `High` (0) means the locomotive already holds the first block of its
/// route; `Normal` (1) means it must request access like any other block.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub enum Priority {
    /// Locomotives start with high priority until the first rendezvous.
    #[default]
    High,
    Normal,
}

impl Priority {
    /// Numeric form: 0 = high, 1 = normal.
    #[inline]
    pub fn as_u8(self) -> u8 {
        match self {
            Priority::High   => 0,
            Priority::Normal => 1,
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = CoreError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            0 => Ok(Priority::High),
            1 => Ok(Priority::Normal),
            other => Err(CoreError::Priority(other)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High   => f.write_str("high"),
            Priority::Normal => f.write_str("normal"),
        }
    }
}
