//! In-memory simulated track.
//!
//! # Movement model
//!
//! Each locomotive is registered with its *contact circuit*: the cyclic list
//! of contacts it passes on its route.  A locomotive only advances while a
//! thread is inside [`ContactSource::wait_for_contact`] for it: the waiting
//! thread travels to the next contact (sleeping for the configured interval
//! plus jitter), records that the contact fired, and repeats until it hits
//! the contact it was waiting for.  Because the locomotive's own controller
//! thread drives its motion, a contact can never fire "between" two waits and
//! be missed.
//!
//! While a locomotive is stopped the waiting thread blocks on the motion
//! condition variable until some thread calls [`Locomotive::start`] or the
//! track is closed.  A stop issued mid-trip restarts the trip once the
//! locomotive moves again.

use std::sync::Arc;
use std::time::Instant;

use loco_core::{ContactId, Direction, JunctionId, JunctionSetting, LocoId, LocoRng, RunConfig};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use crate::{
    ContactSource, JunctionActuator, LayoutControl, Locomotive, TrackError, TrackEvent, TrackLog,
    TrackResult,
};

#[cfg(feature = "fx-hash")]
type Map<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
type Map<K, V> = std::collections::HashMap<K, V>;

// ── Internal state ────────────────────────────────────────────────────────────

struct LocoState {
    circuit: Vec<ContactId>,
    /// Index into `circuit` of the next contact the locomotive will reach.
    next:    usize,
    moving:  bool,
    speed:   u32,
    lights:  bool,
    message: Option<String>,
    rng:     LocoRng,
}

#[derive(Default)]
struct TrackState {
    layout:     Option<String>,
    in_service: bool,
    closed:     bool,
    junctions:  Map<JunctionId, Direction>,
    locos:      Map<LocoId, LocoState>,
}

struct Shared {
    config: RunConfig,
    state:  Mutex<TrackState>,
    /// Signalled on every start, stop and on close.
    motion: Condvar,
    log:    TrackLog,
}

// ── TrackSim ──────────────────────────────────────────────────────────────────

/// The simulated layout.  Cheap to clone; all clones share one track.
#[derive(Clone)]
pub struct TrackSim {
    shared: Arc<Shared>,
}

impl TrackSim {
    /// Create an empty track using the travel timing and seed of `config`.
    pub fn new(config: &RunConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config: config.clone(),
                state:  Mutex::new(TrackState::default()),
                motion: Condvar::new(),
                log:    TrackLog::new(),
            }),
        }
    }

    /// Put locomotive `loco` on the track with the given contact circuit and
    /// return its handle.  The locomotive starts stopped, at speed 0, heading
    /// for the first contact of the circuit.
    ///
    /// Registering the same locomotive twice replaces its circuit.
    pub fn add_loco(&self, loco: LocoId, circuit: Vec<ContactId>) -> SimLoco {
        let rng = LocoRng::new(self.shared.config.seed, loco);
        self.shared.state.lock().locos.insert(
            loco,
            LocoState {
                circuit,
                next: 0,
                moving: false,
                speed: 0,
                lights: false,
                message: None,
                rng,
            },
        );
        SimLoco { id: loco, shared: Arc::clone(&self.shared) }
    }

    /// Wake every blocked contact wait with [`TrackError::Closed`].  Further
    /// waits fail immediately.
    pub fn close(&self) {
        self.shared.state.lock().closed = true;
        self.shared.motion.notify_all();
        debug!("track closed");
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    pub fn log(&self) -> &TrackLog {
        &self.shared.log
    }

    /// Current direction of `junction`, if it was ever set.
    pub fn junction(&self, junction: JunctionId) -> Option<Direction> {
        self.shared.state.lock().junctions.get(&junction).copied()
    }

    pub fn is_moving(&self, loco: LocoId) -> bool {
        self.shared.state.lock().locos.get(&loco).is_some_and(|l| l.moving)
    }

    pub fn speed(&self, loco: LocoId) -> Option<u32> {
        self.shared.state.lock().locos.get(&loco).map(|l| l.speed)
    }

    pub fn lights(&self, loco: LocoId) -> bool {
        self.shared.state.lock().locos.get(&loco).is_some_and(|l| l.lights)
    }

    /// Last text shown by `loco`.
    pub fn message(&self, loco: LocoId) -> Option<String> {
        self.shared.state.lock().locos.get(&loco).and_then(|l| l.message.clone())
    }

    /// The contact `loco` will reach next.
    pub fn next_contact(&self, loco: LocoId) -> Option<ContactId> {
        self.shared
            .state
            .lock()
            .locos
            .get(&loco)
            .and_then(|l| l.circuit.get(l.next).copied())
    }

    /// Selected layout id while the layout is in service.
    pub fn layout(&self) -> Option<String> {
        let state = self.shared.state.lock();
        if state.in_service { state.layout.clone() } else { None }
    }
}

impl JunctionActuator for TrackSim {
    fn set_junction(&self, setting: JunctionSetting) {
        self.shared.state.lock().junctions.insert(setting.junction, setting.direction);
        self.shared.log.push(TrackEvent::Junction(setting));
        debug!(%setting, "junction set");
    }
}

impl LayoutControl for TrackSim {
    fn select_layout(&self, id: &str) {
        {
            let mut state = self.shared.state.lock();
            state.layout = Some(id.to_owned());
            state.in_service = true;
        }
        self.shared.log.push(TrackEvent::LayoutSelected(id.to_owned()));
        info!(layout = id, "layout selected");
    }

    fn out_of_service(&self) {
        self.shared.state.lock().in_service = false;
        self.shared.log.push(TrackEvent::OutOfService);
        info!("layout out of service");
    }
}

// ── SimLoco ───────────────────────────────────────────────────────────────────

/// Handle to one locomotive on a [`TrackSim`].
///
/// Implements both [`Locomotive`] (motion commands) and [`ContactSource`]
/// (contact waits for this locomotive).
#[derive(Clone)]
pub struct SimLoco {
    id:     LocoId,
    shared: Arc<Shared>,
}

impl SimLoco {
    /// Apply `f` to this locomotive's state, if it is still registered.
    fn update(&self, f: impl FnOnce(&mut LocoState)) {
        if let Some(loco) = self.shared.state.lock().locos.get_mut(&self.id) {
            f(loco);
        }
    }

    fn set_moving(&self, moving: bool) {
        self.update(|l| l.moving = moving);
        self.shared.motion.notify_all();
        self.shared.log.push(if moving {
            TrackEvent::Started(self.id)
        } else {
            TrackEvent::Stopped(self.id)
        });
    }
}

impl Locomotive for SimLoco {
    fn id(&self) -> LocoId {
        self.id
    }

    fn start(&self) {
        self.set_moving(true);
        debug!(loco = %self.id, "start");
    }

    fn stop(&self) {
        self.set_moving(false);
        debug!(loco = %self.id, "stop");
    }

    fn set_speed(&self, speed: u32) {
        self.update(|l| l.speed = speed);
        self.shared.log.push(TrackEvent::Speed { loco: self.id, speed });
    }

    fn set_position(&self, front: ContactId, back: ContactId) {
        let id = self.id;
        self.update(|l| match l.circuit.iter().position(|&c| c == front) {
            Some(i) => l.next = i,
            None => warn!(loco = %id, %front, %back, "station contact not on circuit; position unchanged"),
        });
    }

    fn lights_on(&self) {
        self.update(|l| l.lights = true);
    }

    fn message(&self, text: &str) {
        self.update(|l| l.message = Some(text.to_owned()));
        info!(loco = %self.id, "{text}");
    }
}

impl ContactSource for SimLoco {
    fn wait_for_contact(&self, contact: ContactId) -> TrackResult<()> {
        let shared = &*self.shared;
        let mut state = shared.state.lock();

        match state.locos.get(&self.id) {
            None => return Err(TrackError::UnknownLoco(self.id)),
            Some(l) if !l.circuit.contains(&contact) => {
                return Err(TrackError::NotOnCircuit { loco: self.id, contact });
            }
            Some(_) => {}
        }

        loop {
            // Wait until the locomotive is moving.
            loop {
                if state.closed {
                    return Err(TrackError::Closed);
                }
                if state.locos.get(&self.id).is_some_and(|l| l.moving) {
                    break;
                }
                shared.motion.wait(&mut state);
            }

            // Travel to the next contact.
            let trip = match state.locos.get_mut(&self.id) {
                Some(l) => shared
                    .config
                    .contact_interval(l.speed)
                    .saturating_add(l.rng.jitter(shared.config.jitter_ms)),
                None => return Err(TrackError::UnknownLoco(self.id)),
            };
            if !trip.is_zero() {
                match Instant::now().checked_add(trip) {
                    Some(deadline) => {
                        while !state.closed && !shared.motion.wait_until(&mut state, deadline).timed_out() {}
                    }
                    // Too far out to schedule: the trip only ends when the track closes.
                    None => {
                        while !state.closed {
                            shared.motion.wait(&mut state);
                        }
                    }
                }
            }
            if state.closed {
                return Err(TrackError::Closed);
            }

            let Some(l) = state.locos.get_mut(&self.id) else {
                return Err(TrackError::UnknownLoco(self.id));
            };
            if !l.moving {
                // Stopped mid-trip; the trip starts over once restarted.
                continue;
            }
            let reached = l.circuit[l.next];
            l.next = (l.next + 1) % l.circuit.len();

            shared.log.push(TrackEvent::Contact { loco: self.id, contact: reached });
            debug!(loco = %self.id, contact = %reached, "contact");

            if reached == contact {
                return Ok(());
            }
        }
    }
}
