//! The per-block coordinator.

use std::sync::Arc;
use std::time::{Duration, Instant};

use loco_core::{BlockId, EventSink, LocoId, Priority, ProtocolConfig, ProtocolEvent};
use loco_track::Locomotive;
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::{Departure, SectionGrant, SyncError, SyncResult};

// ── State ─────────────────────────────────────────────────────────────────────

/// Station rendezvous progress for the current lap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Rendezvous {
    /// Nobody at the station.
    Empty,
    /// `first` is parked, waiting for its partner.
    Waiting { first: LocoId },
    /// `second` arrived and is running the grace period and block hand-off.
    Resolving { first: LocoId, second: LocoId },
}

struct SectionState {
    /// `None` ⇔ the block is free.
    holder:     Option<LocoId>,
    /// Locomotive parked in `access`, waiting for `leave`.
    waiting:    Option<LocoId>,
    rendezvous: Rendezvous,
    /// Number of rendezvous completed.  A parked first arrival waits for this
    /// to move past the value it saw on arrival.
    releases:   u64,
    shut_down:  bool,
}

// ── SharedSection ─────────────────────────────────────────────────────────────

/// Coordinator for one physical block shared by two locomotives.
///
/// All state sits behind one short-held mutex.  The two kinds of long waits
/// use separate condition variables (`section_free` for `access`,
/// `station_release` for the rendezvous) and every wait re-checks its own
/// predicate, so a release that happens before the waiter reaches its wait
/// is never lost and a spurious wakeup never produces a double hold.
/// Locomotive motion calls and the grace period run with the lock released.
pub struct SharedSection {
    block:           BlockId,
    grace:           Duration,
    sink:            Arc<dyn EventSink>,
    state:           Mutex<SectionState>,
    section_free:    Condvar,
    station_release: Condvar,
}

impl SharedSection {
    pub fn new(block: BlockId, config: &ProtocolConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            block,
            grace: config.station_grace(),
            sink,
            state: Mutex::new(SectionState {
                holder:     None,
                waiting:    None,
                rendezvous: Rendezvous::Empty,
                releases:   0,
                shut_down:  false,
            }),
            section_free:    Condvar::new(),
            station_release: Condvar::new(),
        }
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    // ── Block access ──────────────────────────────────────────────────────

    /// Take the block for `loco`, blocking while the other locomotive holds
    /// it.
    ///
    /// A free block is taken immediately.  A held block stops the
    /// locomotive, parks the calling thread until [`leave`](Self::leave)
    /// hands the block over, then restarts the locomotive.
    ///
    /// # Errors
    ///
    /// - [`SyncError::AlreadyHolding`] if `loco` already holds the block.
    /// - [`SyncError::TooManyContenders`] if another locomotive is already
    ///   parked on this block.
    /// - [`SyncError::ShutDown`] if the section is (or gets) shut down.
    pub fn access<L: Locomotive + ?Sized>(&self, loco: &L) -> SyncResult<SectionGrant> {
        let id = loco.id();
        let mut state = self.state.lock();
        self.check_open(&state)?;

        match (state.holder, state.waiting) {
            (None, _) => return Ok(self.grant(&mut state, id)),
            (Some(holder), _) if holder == id => {
                return Err(SyncError::AlreadyHolding { loco: id, block: self.block });
            }
            (Some(_), Some(waiting)) => {
                return Err(SyncError::TooManyContenders { loco: id, block: self.block, waiting });
            }
            (Some(holder), None) => {
                state.waiting = Some(id);
                self.sink.record(&ProtocolEvent::Parked { loco: id, block: self.block });
                info!(loco = %id, block = %self.block, %holder, "block held; stopping and waiting");
            }
        }
        drop(state);

        loco.stop();
        loco.message("Stopping and waiting");

        let mut state = self.state.lock();
        // `leave` hands the block over by setting `holder` and clearing
        // `waiting`, so ownership is the only predicate to wait on.
        while state.holder != Some(id) {
            if state.shut_down {
                if state.waiting == Some(id) {
                    state.waiting = None;
                }
                warn!(loco = %id, block = %self.block, "shut down while waiting for block");
                return Err(SyncError::ShutDown(self.block));
            }
            self.section_free.wait(&mut state);
        }
        drop(state);

        loco.start();
        loco.message("Restarting");
        Ok(SectionGrant::new(self.block, id))
    }

    /// Give the block back.  If the other locomotive is parked in
    /// [`access`](Self::access), the block passes directly to it and its
    /// thread is woken; otherwise the block becomes free.  Never blocks.
    ///
    /// # Errors
    ///
    /// - [`SyncError::ForeignGrant`] if `grant` was issued by another block.
    /// - [`SyncError::NotHolding`] if `loco` is not the current holder.
    pub fn leave<L: Locomotive + ?Sized>(&self, grant: SectionGrant, loco: &L) -> SyncResult<()> {
        let id = loco.id();
        if grant.block() != self.block {
            return Err(SyncError::ForeignGrant { grant: grant.block(), block: self.block });
        }

        let mut state = self.state.lock();
        if grant.loco() != id || state.holder != Some(id) {
            return Err(SyncError::NotHolding { loco: id, block: self.block, holder: state.holder });
        }

        self.sink.record(&ProtocolEvent::Released { loco: id, block: self.block });
        info!(loco = %id, block = %self.block, "left block");

        match state.waiting.take() {
            Some(next) => {
                // Hand-off under the lock: the block is never observably free.
                state.holder = Some(next);
                self.sink.record(&ProtocolEvent::Granted { loco: next, block: self.block });
                info!(loco = %next, block = %self.block, "block handed over");
                self.section_free.notify_one();
            }
            None => state.holder = None,
        }
        Ok(())
    }

    // ── Station rendezvous ────────────────────────────────────────────────

    /// Stop `loco` at the station and decide the departure order of the next
    /// lap.
    ///
    /// The first locomotive to arrive stops and parks until its partner has
    /// arrived, waited the grace period, and taken this block.  It then
    /// restarts and returns [`Priority::Normal`] without a grant.  The second
    /// returns [`Priority::High`] together with the grant for this block.
    ///
    /// Arrival order is the order in which the two threads take the section
    /// lock; simultaneous arrivals are not otherwise tie-broken.
    ///
    /// # Errors
    ///
    /// - [`SyncError::AlreadyAtStation`] if `loco` is the one already parked.
    /// - [`SyncError::StationOverbooked`] if a rendezvous is still resolving.
    /// - [`SyncError::ShutDown`] on shutdown, and anything
    ///   [`access`](Self::access) returns.
    pub fn stop_at_station<L: Locomotive + ?Sized>(&self, loco: &L) -> SyncResult<Departure> {
        let id = loco.id();
        let mut state = self.state.lock();
        self.check_open(&state)?;

        self.sink.record(&ProtocolEvent::StationArrived { loco: id, block: self.block });
        info!(loco = %id, block = %self.block, "arrived at station");

        let rendezvous = state.rendezvous;
        match rendezvous {
            Rendezvous::Empty => {
                state.rendezvous = Rendezvous::Waiting { first: id };
                let ticket = state.releases;
                self.sink.record(&ProtocolEvent::StationParked { loco: id, block: self.block });
                drop(state);

                loco.stop();
                self.wait_for_release(id, ticket)?;

                self.depart(loco, Priority::Normal);
                Ok(Departure::normal())
            }
            Rendezvous::Waiting { first } if first != id => {
                state.rendezvous = Rendezvous::Resolving { first, second: id };
                drop(state);

                loco.stop();
                self.wait_grace(id)?;

                // Take the block before the first arrival can move, so it
                // cannot race us for it.
                let grant = self.access(loco)?;

                let mut state = self.state.lock();
                state.rendezvous = Rendezvous::Empty;
                state.releases += 1;
                self.station_release.notify_one();
                drop(state);
                debug!(loco = %id, partner = %first, block = %self.block, "released partner");

                self.depart(loco, Priority::High);
                Ok(Departure::high(grant))
            }
            Rendezvous::Waiting { .. } => {
                Err(SyncError::AlreadyAtStation { loco: id, block: self.block })
            }
            Rendezvous::Resolving { .. } => {
                Err(SyncError::StationOverbooked { loco: id, block: self.block })
            }
        }
    }

    // ── Shutdown and inspection ───────────────────────────────────────────

    /// Wake every parked thread with [`SyncError::ShutDown`].  Later calls to
    /// `access` and `stop_at_station` fail immediately; `leave` still works.
    pub fn shutdown(&self) {
        self.state.lock().shut_down = true;
        self.section_free.notify_all();
        self.station_release.notify_all();
        debug!(block = %self.block, "section shut down");
    }

    /// Current holder, `None` when the block is free.
    pub fn holder(&self) -> Option<LocoId> {
        self.state.lock().holder
    }

    pub fn is_free(&self) -> bool {
        self.holder().is_none()
    }

    /// Locomotive currently parked in `access`, if any.
    pub fn waiting(&self) -> Option<LocoId> {
        self.state.lock().waiting
    }

    /// Number of locomotives at the station that have not departed yet.
    pub fn station_occupants(&self) -> usize {
        match self.state.lock().rendezvous {
            Rendezvous::Empty => 0,
            Rendezvous::Waiting { .. } => 1,
            Rendezvous::Resolving { .. } => 2,
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn check_open(&self, state: &MutexGuard<'_, SectionState>) -> SyncResult<()> {
        if state.shut_down {
            Err(SyncError::ShutDown(self.block))
        } else {
            Ok(())
        }
    }

    fn grant(&self, state: &mut MutexGuard<'_, SectionState>, id: LocoId) -> SectionGrant {
        state.holder = Some(id);
        self.sink.record(&ProtocolEvent::Granted { loco: id, block: self.block });
        info!(loco = %id, block = %self.block, "access to block");
        SectionGrant::new(self.block, id)
    }

    fn wait_for_release(&self, id: LocoId, ticket: u64) -> SyncResult<()> {
        let mut state = self.state.lock();
        while state.releases == ticket {
            if state.shut_down {
                warn!(loco = %id, block = %self.block, "shut down while parked at station");
                return Err(SyncError::ShutDown(self.block));
            }
            self.station_release.wait(&mut state);
        }
        Ok(())
    }

    /// Sleep the grace period on the station condvar so a shutdown can cut
    /// it short.
    fn wait_grace(&self, id: LocoId) -> SyncResult<()> {
        if self.grace.is_zero() {
            return Ok(());
        }
        info!(loco = %id, block = %self.block, grace_ms = self.grace.as_millis() as u64, "station grace period");
        let deadline = Instant::now() + self.grace;
        let mut state = self.state.lock();
        while !state.shut_down && !self.station_release.wait_until(&mut state, deadline).timed_out() {}
        self.check_open(&state)
    }

    fn depart<L: Locomotive + ?Sized>(&self, loco: &L, priority: Priority) {
        let id = loco.id();
        self.sink.record(&ProtocolEvent::Departed { loco: id, block: self.block, priority });
        info!(loco = %id, block = %self.block, %priority, "leaving station");
        loco.start();
    }
}
