//! Deterministic per-locomotive RNG for simulated travel jitter.
//!
//! Each locomotive gets its own `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (loco_number * MIXING_CONSTANT)
//!
//! so the two trains never share RNG state and a run is reproducible from
//! its seed alone.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::LocoId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-locomotive deterministic RNG.
pub struct LocoRng(SmallRng);

impl LocoRng {
    /// Seed deterministically from the run's global seed and a locomotive.
    pub fn new(global_seed: u64, loco: LocoId) -> Self {
        let seed = global_seed ^ (loco.0 as u64).wrapping_mul(MIXING_CONSTANT);
        LocoRng(SmallRng::seed_from_u64(seed))
    }

    /// A uniformly distributed delay in `[0, max_ms]`.  Zero when `max_ms`
    /// is zero.
    pub fn jitter(&mut self, max_ms: u64) -> Duration {
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.0.gen_range(0..=max_ms))
    }
}
