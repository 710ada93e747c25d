//! Protocol events and the sink trait that receives them.
//!
//! Coordinators and controllers report every externally meaningful step
//! (grant, park, release, station arrival and departure, junction throws,
//! lap completion) as a [`ProtocolEvent`].  A sink is shared by both worker
//! threads, so implementations must be `Send + Sync` and must not call back
//! into a coordinator: `Granted` and `Released` are delivered while the
//! section's state lock is held so their order matches the real hand-off
//! order.

use crate::{BlockId, JunctionSetting, LocoId, Priority};

/// One step of the coordination protocol, as seen from outside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// Controller started: lights on, moving, waiting for the station.
    Ready { loco: LocoId },

    /// Locomotive reached its station and entered the rendezvous.
    StationArrived { loco: LocoId, block: BlockId },

    /// First arrival of a lap: stopped and parked until the partner arrives.
    StationParked { loco: LocoId, block: BlockId },

    /// Left the station with the given priority for this lap.
    Departed { loco: LocoId, block: BlockId, priority: Priority },

    /// Block held by the other locomotive; stopped and parked.
    Parked { loco: LocoId, block: BlockId },

    /// Block now held by `loco`.
    Granted { loco: LocoId, block: BlockId },

    /// `loco` left the block.
    Released { loco: LocoId, block: BlockId },

    /// A junction was thrown on behalf of `loco`.
    JunctionSet { loco: LocoId, setting: JunctionSetting },

    /// `loco` finished lap number `lap` (1-based).
    LapCompleted { loco: LocoId, lap: u64 },

    /// Controller exited its run loop after `laps` full laps.
    Stopped { loco: LocoId, laps: u64 },
}

impl ProtocolEvent {
    /// The locomotive the event concerns.
    pub fn loco(&self) -> LocoId {
        match *self {
            ProtocolEvent::Ready { loco }
            | ProtocolEvent::StationArrived { loco, .. }
            | ProtocolEvent::StationParked { loco, .. }
            | ProtocolEvent::Departed { loco, .. }
            | ProtocolEvent::Parked { loco, .. }
            | ProtocolEvent::Granted { loco, .. }
            | ProtocolEvent::Released { loco, .. }
            | ProtocolEvent::JunctionSet { loco, .. }
            | ProtocolEvent::LapCompleted { loco, .. }
            | ProtocolEvent::Stopped { loco, .. } => loco,
        }
    }

    /// The block the event concerns, if any.
    pub fn block(&self) -> Option<BlockId> {
        match *self {
            ProtocolEvent::StationArrived { block, .. }
            | ProtocolEvent::StationParked { block, .. }
            | ProtocolEvent::Departed { block, .. }
            | ProtocolEvent::Parked { block, .. }
            | ProtocolEvent::Granted { block, .. }
            | ProtocolEvent::Released { block, .. } => Some(block),
            _ => None,
        }
    }

    /// Short snake_case label, used as the `event` column of event logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProtocolEvent::Ready { .. }          => "ready",
            ProtocolEvent::StationArrived { .. } => "station_arrived",
            ProtocolEvent::StationParked { .. }  => "station_parked",
            ProtocolEvent::Departed { .. }       => "departed",
            ProtocolEvent::Parked { .. }         => "parked",
            ProtocolEvent::Granted { .. }        => "granted",
            ProtocolEvent::Released { .. }       => "released",
            ProtocolEvent::JunctionSet { .. }    => "junction_set",
            ProtocolEvent::LapCompleted { .. }   => "lap_completed",
            ProtocolEvent::Stopped { .. }        => "stopped",
        }
    }

    /// Event-specific detail (priority, junction setting, lap count), or an
    /// empty string.
    pub fn detail(&self) -> String {
        match self {
            ProtocolEvent::Departed { priority, .. } => priority.to_string(),
            ProtocolEvent::JunctionSet { setting, .. } => setting.to_string(),
            ProtocolEvent::LapCompleted { lap, .. } => lap.to_string(),
            ProtocolEvent::Stopped { laps, .. } => laps.to_string(),
            _ => String::new(),
        }
    }
}

/// Receives protocol events from both worker threads.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &ProtocolEvent);
}

/// An [`EventSink`] that discards everything.
pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&self, _event: &ProtocolEvent) {}
}
