//! `loco-track` — everything on the far side of the coordination protocol.
//!
//! The controller and coordinators only ever talk to the track through the
//! traits in [`traits`]; [`TrackSim`] is an in-memory implementation that
//! moves each locomotive contact by contact around its circuit.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                          |
//! |------------|-------------------------------------------------------------------|
//! | [`traits`] | `ContactSource`, `JunctionActuator`, `Locomotive`, `LayoutControl` |
//! | [`sim`]    | `TrackSim`, `SimLoco`                                             |
//! | [`log`]    | `TrackEvent`, `TrackLog` — ordered record of what the track saw   |
//! | [`error`]  | `TrackError`, `TrackResult<T>`                                    |
//!
//! # Cargo features
//!
//! | Feature   | Effect                                              |
//! |-----------|-----------------------------------------------------|
//! | `fx-hash` | Uses FxHash for the simulator's internal maps.      |

pub mod error;
pub mod log;
pub mod sim;
pub mod traits;

#[cfg(test)]
mod tests;

pub use error::{TrackError, TrackResult};
pub use log::{TrackEvent, TrackLog};
pub use sim::{SimLoco, TrackSim};
pub use traits::{ContactSource, JunctionActuator, LayoutControl, Locomotive};
