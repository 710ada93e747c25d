//! Protocol and run configuration.
//!
//! Typically loaded from a JSON file by the application crate (with the
//! `serde` feature) and passed to the runner.  Every field has a default so a
//! partial file is accepted.

use std::time::Duration;

/// Parameters of the coordination protocol itself.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProtocolConfig {
    /// How long the last locomotive to reach the station waits before it
    /// claims the first block and releases the other one.  Default: 5000 ms.
    ///
    /// Lets both trains come to a visible stop; correctness does not depend
    /// on it, so tests run with 0.
    pub station_grace_ms: u64,
}

impl ProtocolConfig {
    #[inline]
    pub fn station_grace(&self) -> Duration {
        Duration::from_millis(self.station_grace_ms)
    }

    /// Configuration with no grace delay.
    pub fn immediate() -> Self {
        Self { station_grace_ms: 0 }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self { station_grace_ms: 5_000 }
    }
}

/// Top-level configuration for one run of the two-train layout.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunConfig {
    pub protocol: ProtocolConfig,

    /// Simulated travel time between two consecutive contacts for a
    /// locomotive at speed 10.  Faster locomotives scale it down.
    pub contact_interval_ms: u64,

    /// Upper bound of the random extra delay added to each contact-to-contact
    /// trip.  0 disables jitter.
    pub jitter_ms: u64,

    /// Master RNG seed for travel jitter.  Same seed, same delays.
    pub seed: u64,

    /// Stop both trains after this many completed laps.  `None` runs until
    /// halted.
    pub max_laps: Option<u64>,
}

impl RunConfig {
    /// Travel time between two contacts for a locomotive running at `speed`.
    ///
    /// Speed 0 is treated as 1 so a stopped-by-speed locomotive still has a
    /// finite (long) trip rather than a division by zero.
    pub fn contact_interval(&self, speed: u32) -> Duration {
        let speed = speed.max(1) as u64;
        Duration::from_millis(self.contact_interval_ms.saturating_mul(10) / speed)
    }

    /// A configuration suited to tests: no grace, no travel time, no jitter.
    pub fn instant(max_laps: u64) -> Self {
        Self {
            protocol:            ProtocolConfig::immediate(),
            contact_interval_ms: 0,
            jitter_ms:           0,
            seed:                0,
            max_laps:            Some(max_laps),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            protocol:            ProtocolConfig::default(),
            contact_interval_ms: 400,
            jitter_ms:           0,
            seed:                42,
            max_laps:            None,
        }
    }
}
