//! The two-train runner.

use std::sync::Arc;
use std::thread;

use loco_control::{AgentController, ControlError, RunOutcome, StopSignal};
use loco_core::{LocoId, RunConfig};
use loco_layout::Layout;
use loco_sync::SectionRegistry;
use loco_track::{LayoutControl, Locomotive, SimLoco, TrackSim};
use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::{SimError, SimResult};

type SimController = AgentController<SimLoco, SimLoco, TrackSim>;

// ── RunReport ─────────────────────────────────────────────────────────────────

/// Per-locomotive outcomes of a completed run, in layout order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub outcomes: Vec<RunOutcome>,
}

impl RunReport {
    pub fn outcome(&self, loco: LocoId) -> Option<&RunOutcome> {
        self.outcomes.iter().find(|o| o.loco == loco)
    }

    /// Laps completed by the slowest locomotive.
    pub fn min_laps(&self) -> u64 {
        self.outcomes.iter().map(|o| o.laps).min().unwrap_or(0)
    }
}

// ── RailwayHandle ─────────────────────────────────────────────────────────────

/// Stops a running [`Railway`] from any thread.  Cheap to clone.
#[derive(Clone)]
pub struct RailwayHandle {
    stop:     StopSignal,
    registry: Arc<SectionRegistry>,
    track:    TrackSim,
    locos:    Vec<SimLoco>,
}

impl RailwayHandle {
    /// End the run: raise the stop signal, shut every coordinator down and
    /// close the track so parked and travelling controllers return.
    /// Idempotent.
    pub fn halt(&self) {
        self.stop.stop();
        self.registry.shutdown_all();
        self.track.close();
    }

    /// Stop both locomotives dead (stop and speed 0), then halt.
    pub fn emergency_stop(&self) {
        warn!("emergency stop");
        for loco in &self.locos {
            loco.stop();
            loco.set_speed(0);
        }
        self.halt();
    }

    pub fn is_halted(&self) -> bool {
        self.stop.is_stopped()
    }
}

/// Halts the railway if the owning controller thread unwinds, so the partner
/// is not left parked on a coordinator.
struct HaltOnPanic<'a>(&'a RailwayHandle);

impl Drop for HaltOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!("controller panicked; halting railway");
            self.0.halt();
        }
    }
}

// ── Railway ───────────────────────────────────────────────────────────────────

/// A built layout, ready to run.  Create with
/// [`RailwayBuilder`][crate::RailwayBuilder].
pub struct Railway {
    layout:      Layout,
    config:      RunConfig,
    track:       TrackSim,
    handle:      RailwayHandle,
    controllers: Vec<SimController>,
}

impl Railway {
    pub(crate) fn new(
        layout:      Layout,
        config:      RunConfig,
        track:       TrackSim,
        registry:    Arc<SectionRegistry>,
        stop:        StopSignal,
        locos:       Vec<SimLoco>,
        controllers: Vec<SimController>,
    ) -> Self {
        let handle = RailwayHandle { stop, registry, track: track.clone(), locos };
        Self { layout, config, track, handle, controllers }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The simulated track, for inspecting its log after a run.
    pub fn track(&self) -> &TrackSim {
        &self.track
    }

    /// Handle for stopping the run from another thread.
    pub fn handle(&self) -> RailwayHandle {
        self.handle.clone()
    }

    /// Run one thread per train until every controller returns, then put the
    /// layout out of service.
    ///
    /// With `max_laps` set both trains stop at their station after that many
    /// laps.  Without it the run lasts until [`RailwayHandle::halt`].  A
    /// controller that fails halts the whole railway so its partner is not
    /// left waiting; the first failure is returned.
    pub fn run(self) -> SimResult<RunReport> {
        let Self { config, track, handle, controllers, .. } = self;
        let max_laps = config.max_laps;
        let first_error: Mutex<Option<ControlError>> = Mutex::new(None);

        info!(?max_laps, "starting trains");
        let joined = thread::scope(|scope| -> SimResult<Vec<_>> {
            let mut threads = Vec::with_capacity(controllers.len());
            for mut controller in controllers {
                let loco = controller.loco_id();
                let (handle, first_error) = (&handle, &first_error);
                let spawned = thread::Builder::new()
                    .name(format!("loco-{}", loco.get()))
                    .spawn_scoped(scope, move || {
                        let _guard = HaltOnPanic(handle);
                        let result = controller.run(max_laps);
                        if let Err(e) = &result {
                            error!(%loco, error = %e, "controller failed; halting railway");
                            first_error.lock().get_or_insert_with(|| e.clone());
                            handle.halt();
                        }
                        result
                    });
                match spawned {
                    Ok(t) => threads.push((loco, t)),
                    Err(e) => {
                        handle.halt();
                        return Err(SimError::Spawn(e));
                    }
                }
            }
            Ok(threads.into_iter().map(|(loco, t)| (loco, t.join())).collect())
        })?;

        track.out_of_service();

        let mut outcomes = Vec::with_capacity(joined.len());
        for (loco, result) in joined {
            match result {
                Ok(Ok(outcome)) => outcomes.push(outcome),
                Ok(Err(_)) => {}
                Err(_) => {
                    handle.halt();
                    return Err(SimError::Panicked(loco));
                }
            }
        }
        if let Some(e) = first_error.into_inner() {
            return Err(SimError::Control(e));
        }

        let report = RunReport { outcomes };
        info!(laps = report.min_laps(), "run complete");
        Ok(report)
    }
}
