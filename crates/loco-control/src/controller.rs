//! The per-locomotive run loop.

use std::sync::Arc;

use loco_core::{ContactId, EventSink, LocoId, NoopSink, Priority, ProtocolEvent};
use loco_layout::Route;
use loco_sync::{SectionGrant, SectionRegistry};
use loco_track::{ContactSource, JunctionActuator, Locomotive};
use tracing::{debug, info};

use crate::{ControlError, ControlResult, Leg, StopSignal, legs_for};

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Why a controller left its run loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The lap limit was reached; the locomotive is parked at its station.
    Finished,
    /// A stop was requested, or the sections or track were shut down.
    Stopped,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    pub loco:   LocoId,
    /// Laps completed (station back to station).
    pub laps:   u64,
    pub reason: StopReason,
}

// ── AgentController ───────────────────────────────────────────────────────────

/// Drives one locomotive around its route, forever or for a fixed number of
/// laps.
///
/// # Lap
///
/// ```text
/// stop_at_station(B1)                    → priority (+ grant for B1 if High)
/// for each block Bi:
///     wait Bi.warn  (skipped if it is the station contact)
///     use the station grant (B1 only) or access(Bi)
///     wait Bi.enter → throw entry junction, then exit junction
///     wait Bi.exit  → leave(Bi)
/// wait station contact (skipped if it was the last exit contact)
/// ```
///
/// The controller owns no lock.  All blocking happens in the contact source
/// and in the coordinators, so the controller only has to run on its own
/// thread.
pub struct AgentController<L, C, J> {
    station:   ContactId,
    legs:      Vec<Leg>,
    loco:      L,
    contacts:  C,
    junctions: J,
    sink:      Arc<dyn EventSink>,
    stop:      StopSignal,
    priority:  Priority,
    laps:      u64,
}

impl<L, C, J> AgentController<L, C, J>
where
    L: Locomotive,
    C: ContactSource,
    J: JunctionActuator,
{
    /// Bind `route` to the coordinators in `registry`.
    ///
    /// # Errors
    ///
    /// [`ControlError::Sync`] if a block of the route has no coordinator.
    pub fn new(
        route:     &Route,
        registry:  &SectionRegistry,
        loco:      L,
        contacts:  C,
        junctions: J,
    ) -> ControlResult<Self> {
        Ok(Self {
            station: route.station_contact(),
            legs: legs_for(route, registry)?,
            loco,
            contacts,
            junctions,
            sink: Arc::new(NoopSink),
            stop: StopSignal::new(),
            priority: Priority::default(),
            laps: 0,
        })
    }

    /// Report protocol events to `sink` instead of discarding them.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Share `stop` with whoever may end the run.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn loco_id(&self) -> LocoId {
        self.loco.id()
    }

    /// Priority for the current lap.  `Normal` again once a `High` lap has
    /// used its station grant.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn laps(&self) -> u64 {
        self.laps
    }

    // ── Run loop ──────────────────────────────────────────────────────────

    /// Start the locomotive and run laps until `max_laps` are complete or the
    /// run is stopped.
    ///
    /// With a lap limit, the final station stop still takes part in the
    /// rendezvous so the other locomotive is never left parked there; both
    /// controllers must use the same limit.
    ///
    /// # Errors
    ///
    /// Protocol violations and track faults.  Shutdown of the sections or
    /// the track is reported as `Ok` with [`StopReason::Stopped`].
    pub fn run(&mut self, max_laps: Option<u64>) -> ControlResult<RunOutcome> {
        let reason = match self.run_laps(max_laps) {
            Ok(reason) => reason,
            Err(e) if e.is_shutdown() => {
                debug!(loco = %self.loco_id(), "run interrupted by shutdown");
                StopReason::Stopped
            }
            Err(e) => return Err(e),
        };

        let loco = self.loco_id();
        self.sink.record(&ProtocolEvent::Stopped { loco, laps: self.laps });
        info!(%loco, laps = self.laps, ?reason, "controller stopped");
        Ok(RunOutcome { loco, laps: self.laps, reason })
    }

    fn run_laps(&mut self, max_laps: Option<u64>) -> ControlResult<StopReason> {
        self.startup()?;

        loop {
            self.check_stop()?;

            let Some(first) = self.legs.first() else {
                return Ok(StopReason::Finished);
            };
            let departure = first.section.stop_at_station(&self.loco)?;
            self.priority = departure.priority;

            if max_laps.is_some_and(|max| self.laps >= max) {
                if let Some(grant) = departure.grant {
                    first.section.leave(grant, &self.loco)?;
                }
                self.loco.stop();
                self.loco.message("Finished");
                return Ok(StopReason::Finished);
            }

            self.lap(departure.grant)?;
            self.laps += 1;
            self.sink.record(&ProtocolEvent::LapCompleted { loco: self.loco_id(), lap: self.laps });
            info!(loco = %self.loco_id(), lap = self.laps, "lap completed");
        }
    }

    fn check_stop(&self) -> ControlResult<()> {
        if self.stop.is_stopped() { Err(ControlError::StopRequested) } else { Ok(()) }
    }

    fn startup(&mut self) -> ControlResult<()> {
        let loco = self.loco_id();
        self.loco.lights_on();
        self.loco.start();
        self.loco.message("Ready!");
        self.sink.record(&ProtocolEvent::Ready { loco });
        info!(%loco, station = %self.station, "ready, heading for station");
        self.contacts.wait_for_contact(self.station)?;
        Ok(())
    }

    /// One pass over every block, ending on the station contact.
    fn lap(&mut self, mut station_grant: Option<SectionGrant>) -> ControlResult<()> {
        let loco = self.loco_id();

        for i in 0..self.legs.len() {
            self.check_stop()?;
            let Leg { block, section } = self.legs[i].clone();

            if block.warn != self.station {
                self.contacts.wait_for_contact(block.warn)?;
            }

            let grant = match station_grant.take() {
                Some(grant) if i == 0 => {
                    self.priority = Priority::Normal;
                    grant
                }
                _ => section.access(&self.loco)?,
            };

            self.contacts.wait_for_contact(block.enter)?;
            for setting in [block.entry_junction, block.exit_junction] {
                self.junctions.set_junction(setting);
                self.sink.record(&ProtocolEvent::JunctionSet { loco, setting });
            }

            self.contacts.wait_for_contact(block.exit)?;
            section.leave(grant, &self.loco)?;
        }

        let last_exit = self.legs.last().map(|leg| leg.block.exit);
        if last_exit != Some(self.station) {
            self.contacts.wait_for_contact(self.station)?;
        }
        Ok(())
    }
}
