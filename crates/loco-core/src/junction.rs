//! Junction orientation.

use std::fmt;
use std::str::FromStr;

use crate::{CoreError, JunctionId};

/// Which way a junction routes traffic.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Straight,
    Diverted,
}

impl Direction {
    /// Label used in route CSV files and event logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Straight => "straight",
            Direction::Diverted => "diverted",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "straight" | "s" => Ok(Direction::Straight),
            "diverted" | "d" => Ok(Direction::Diverted),
            other => Err(CoreError::Direction(other.to_owned())),
        }
    }
}

/// A junction together with the direction it must be set to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JunctionSetting {
    pub junction:  JunctionId,
    pub direction: Direction,
}

impl JunctionSetting {
    #[inline]
    pub const fn new(junction: u32, direction: Direction) -> Self {
        Self { junction: JunctionId(junction), direction }
    }

    #[inline]
    pub const fn straight(junction: u32) -> Self {
        Self::new(junction, Direction::Straight)
    }

    #[inline]
    pub const fn diverted(junction: u32) -> Self {
        Self::new(junction, Direction::Diverted)
    }
}

impl fmt::Display for JunctionSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.junction, self.direction)
    }
}
