//! `loco-layout` — static description of the track the two trains run on.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`block`]   | `Block` (shared-section descriptor), `Station`              |
//! | [`route`]   | `Route` — station plus ordered blocks, contact circuit      |
//! | [`layout`]  | `TrainSpec`, `Layout` (validated two-train configuration)   |
//! | [`presets`] | `Preset` — the built-in layouts                             |
//! | [`loader`]  | `load_trains_*`, `load_junctions_*`                       |
//! | [`error`]   | `LayoutError`, `LayoutResult<T>`                            |
//!
//! Everything here is read-only once built; both worker threads share it.

pub mod block;
pub mod error;
pub mod layout;
pub mod loader;
pub mod presets;
pub mod route;


pub use block::{Block, Station};
pub use error::{LayoutError, LayoutResult};
pub use layout::{Layout, TrainSpec};
pub use loader::{load_junctions_csv, load_junctions_reader, load_trains_csv, load_trains_reader};
pub use presets::Preset;
pub use route::Route;
