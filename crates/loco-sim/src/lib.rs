//! `loco-sim` — runs the two trains of a layout on the simulated track.
//!
//! # Run lifecycle
//!
//! ```text
//! RailwayBuilder::build
//!   ① select layout, throw initial junctions
//!   ② per train: register contact circuit, set speed, place at station
//!   ③ one SharedSection per physical block
//!   ④ bind each route to its sections (AgentController)
//! Railway::run
//!   ⑤ one named thread per train ("loco-<id>"), controllers run their laps
//!   ⑥ join; a failing controller halts the railway, first error wins
//!   ⑦ layout out of service
//! ```
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`builder`] | `RailwayBuilder`                                           |
//! | [`railway`] | `Railway`, `RailwayHandle` (halt, emergency stop), `RunReport` |
//! | [`sink`]    | `RecordingSink`, `CsvEventLog`                             |
//! | [`error`]   | `SimError`, `OutputError` and their result aliases         |

pub mod builder;
pub mod error;
pub mod railway;
pub mod sink;


pub use builder::RailwayBuilder;
pub use error::{OutputError, OutputResult, SimError, SimResult};
pub use railway::{Railway, RailwayHandle, RunReport};
pub use sink::{CsvEventLog, EVENTS_FILE, RecordingSink};
