//! `loco-sync` — the shared-section coordinator.
//!
//! One [`SharedSection`] exists per physical block.  It serializes access to
//! the block between exactly two locomotives and, for the block that starts
//! both routes, runs the station rendezvous that decides which train leaves
//! first on the next lap.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`section`]  | `SharedSection` — `access`, `leave`, `stop_at_station`    |
//! | [`grant`]    | `SectionGrant` (proof of holding), `Departure`            |
//! | [`registry`] | `SectionRegistry` — one section per `BlockId`             |
//! | [`error`]    | `SyncError`, `SyncResult<T>`                              |
//!
//! # Protocol in one picture
//!
//! ```text
//!            access (free)                 leave (nobody parked)
//!   FREE ─────────────────────▶ HELD(a) ─────────────────────▶ FREE
//!                                 │  ▲
//!               access(b): b parks│  │leave(a): handed to b
//!                                 ▼  │
//!                           HELD(a), b parked ──▶ HELD(b)
//! ```
//!
//! Station rendezvous: the first arrival parks; the second waits the grace
//! period, takes the block with `access`, and only then releases the first.
//! The second arrival departs with [`Priority::High`][loco_core::Priority]
//! and a [`SectionGrant`]; the first departs with `Normal` and no grant.

pub mod error;
pub mod grant;
pub mod registry;
pub mod section;

#[cfg(test)]
mod tests;

pub use error::{SyncError, SyncResult};
pub use grant::{Departure, SectionGrant};
pub use registry::SectionRegistry;
pub use section::SharedSection;
