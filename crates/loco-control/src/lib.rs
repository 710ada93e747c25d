//! `loco-control` — the agent controller.
//!
//! One [`AgentController`] per locomotive, each on its own thread.  The
//! controller walks its route lap after lap, waiting on contacts and calling
//! the shared-section coordinators from `loco-sync`; every blocking decision
//! is made by a coordinator, never by the controller.
//!
//! # Crate layout
//!
//! | Module         | Contents                                               |
//! |----------------|--------------------------------------------------------|
//! | [`controller`] | `AgentController`, `RunOutcome`, `StopReason`          |
//! | [`leg`]        | `Leg` — a route block bound to its coordinator         |
//! | [`signal`]     | `StopSignal` — cooperative stop flag                   |
//! | [`error`]      | `ControlError`, `ControlResult<T>`                     |

pub mod controller;
pub mod error;
pub mod leg;
pub mod signal;


pub use controller::{AgentController, RunOutcome, StopReason};
pub use error::{ControlError, ControlResult};
pub use leg::{Leg, legs_for};
pub use signal::StopSignal;
