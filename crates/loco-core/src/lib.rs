//! `loco-core` — foundational types shared by every `loco-*` crate.
//!
//! This crate has no `loco-*` dependencies and minimal external ones (only
//! `rand` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`ids`]         | `LocoId`, `ContactId`, `JunctionId`, `BlockId`           |
//! | [`junction`]    | `Direction`, `JunctionSetting`                           |
//! | [`priority`]    | `Priority` (high / normal departure rank)                |
//! | [`config`]      | `ProtocolConfig`, `RunConfig`                            |
//! | [`event`]       | `ProtocolEvent`, `EventSink`, `NoopSink`                 |
//! | [`rng`]         | `LocoRng` (per-locomotive travel jitter)                 |
//! | [`error`]       | `CoreError`, `CoreResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, junctions, config.  |

pub mod config;
pub mod error;
pub mod event;
pub mod ids;
pub mod junction;
pub mod priority;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{ProtocolConfig, RunConfig};
pub use error::{CoreError, CoreResult};
pub use event::{EventSink, NoopSink, ProtocolEvent};
pub use ids::{BlockId, ContactId, JunctionId, LocoId};
pub use junction::{Direction, JunctionSetting};
pub use priority::Priority;
pub use rng::LocoRng;
