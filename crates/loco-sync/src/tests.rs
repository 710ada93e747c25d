//! Unit tests for loco-sync.
//!
//! Every test runs with zero grace so the protocol is exercised at full
//! speed; parked threads are observed through the section's inspection
//! methods instead of sleeps where possible.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use loco_core::{BlockId, ContactId, EventSink, LocoId, Priority, ProtocolConfig, ProtocolEvent};
use loco_track::Locomotive;
use parking_lot::Mutex;

use crate::{SectionRegistry, SharedSection, SyncError};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Locomotive that only records the motion commands it receives.
struct TestLoco {
    id:       LocoId,
    commands: Mutex<Vec<&'static str>>,
}

impl TestLoco {
    fn new(id: u32) -> Arc<Self> {
        Arc::new(Self { id: LocoId(id), commands: Mutex::new(Vec::new()) })
    }

    fn commands(&self) -> Vec<&'static str> {
        self.commands.lock().clone()
    }
}

impl Locomotive for TestLoco {
    fn id(&self) -> LocoId {
        self.id
    }

    fn start(&self) {
        self.commands.lock().push("start");
    }

    fn stop(&self) {
        self.commands.lock().push("stop");
    }

    fn set_speed(&self, _speed: u32) {}

    fn set_position(&self, _front: ContactId, _back: ContactId) {}

    fn lights_on(&self) {}

    fn message(&self, _text: &str) {}
}

#[derive(Default)]
struct Events(Mutex<Vec<ProtocolEvent>>);

impl EventSink for Events {
    fn record(&self, event: &ProtocolEvent) {
        self.0.lock().push(event.clone());
    }
}

impl Events {
    fn kinds_of(&self, loco: LocoId) -> Vec<&'static str> {
        self.0.lock().iter().filter(|e| e.loco() == loco).map(|e| e.kind()).collect()
    }

    fn grant_order(&self) -> Vec<(&'static str, LocoId)> {
        self.0
            .lock()
            .iter()
            .filter(|e| matches!(e, ProtocolEvent::Granted { .. } | ProtocolEvent::Released { .. }))
            .map(|e| (e.kind(), e.loco()))
            .collect()
    }
}

fn section(block: u32) -> (Arc<SharedSection>, Arc<Events>) {
    let events = Arc::new(Events::default());
    let sink: Arc<dyn EventSink> = events.clone();
    (Arc::new(SharedSection::new(BlockId(block), &ProtocolConfig::immediate(), sink)), events)
}

/// Poll `cond` until it holds; panics after five seconds.
fn eventually(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for: {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

// ── Block access ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod access {
    use super::*;

    #[test]
    fn free_block_is_granted_immediately() {
        let (s, _) = section(1);
        let a = TestLoco::new(1);
        let grant = s.access(&*a).unwrap();
        assert_eq!(grant.block(), BlockId(1));
        assert_eq!(grant.loco(), LocoId(1));
        assert_eq!(s.holder(), Some(LocoId(1)));
        assert!(a.commands().is_empty(), "no stop/start on an uncontended access");
        s.leave(grant, &*a).unwrap();
    }

    #[test]
    fn leave_frees_an_uncontended_block() {
        let (s, events) = section(1);
        let a = TestLoco::new(1);
        let grant = s.access(&*a).unwrap();
        s.leave(grant, &*a).unwrap();
        assert!(s.is_free());
        assert_eq!(events.kinds_of(LocoId(1)), ["granted", "released"]);
    }

    #[test]
    fn double_access_is_rejected() {
        let (s, _) = section(1);
        let a = TestLoco::new(1);
        let _grant = s.access(&*a).unwrap();
        assert_eq!(
            s.access(&*a),
            Err(SyncError::AlreadyHolding { loco: LocoId(1), block: BlockId(1) })
        );
    }

    #[test]
    fn parked_access_is_handed_the_block_by_leave() {
        let (s, events) = section(1);
        let a = TestLoco::new(1);
        let b = TestLoco::new(2);
        let grant_a = s.access(&*a).unwrap();

        let waiter = {
            let (s, b) = (Arc::clone(&s), Arc::clone(&b));
            thread::spawn(move || s.access(&*b))
        };
        eventually("b parked", || s.waiting() == Some(LocoId(2)));
        assert_eq!(s.holder(), Some(LocoId(1)));

        s.leave(grant_a, &*a).unwrap();
        let grant_b = waiter.join().unwrap().unwrap();

        assert_eq!(grant_b.loco(), LocoId(2));
        assert_eq!(s.holder(), Some(LocoId(2)));
        assert_eq!(s.waiting(), None);
        assert_eq!(b.commands(), ["stop", "start"]);
        assert_eq!(
            events.grant_order(),
            [
                ("granted", LocoId(1)),
                ("released", LocoId(1)),
                ("granted", LocoId(2)),
            ]
        );
        s.leave(grant_b, &*b).unwrap();
        assert!(s.is_free());
    }

    #[test]
    fn third_contender_is_rejected() {
        let (s, _) = section(1);
        let a = TestLoco::new(1);
        let b = TestLoco::new(2);
        let c = TestLoco::new(3);
        let _grant = s.access(&*a).unwrap();

        let waiter = {
            let (s, b) = (Arc::clone(&s), Arc::clone(&b));
            thread::spawn(move || s.access(&*b))
        };
        eventually("b parked", || s.waiting() == Some(LocoId(2)));

        assert_eq!(
            s.access(&*c),
            Err(SyncError::TooManyContenders {
                loco:    LocoId(3),
                block:   BlockId(1),
                waiting: LocoId(2),
            })
        );

        s.shutdown();
        assert_eq!(waiter.join().unwrap(), Err(SyncError::ShutDown(BlockId(1))));
    }

    #[test]
    fn mutual_exclusion_under_contention() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        const ROUNDS: usize = 500;
        let (s, _) = section(1);
        let inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = [1, 2]
            .into_iter()
            .map(|id| {
                let (s, inside) = (Arc::clone(&s), Arc::clone(&inside));
                thread::spawn(move || {
                    let loco = TestLoco::new(id);
                    for _ in 0..ROUNDS {
                        let grant = s.access(&*loco).unwrap();
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0, "double hold");
                        thread::yield_now();
                        inside.fetch_sub(1, Ordering::SeqCst);
                        s.leave(grant, &*loco).unwrap();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert!(s.is_free());
        assert_eq!(s.waiting(), None);
    }
}

// ── Leave contract ────────────────────────────────────────────────────────────

#[cfg(test)]
mod leave {
    use super::*;

    #[test]
    fn grant_from_another_block_is_rejected() {
        let (one, _) = section(1);
        let (two, _) = section(2);
        let a = TestLoco::new(1);
        let grant = one.access(&*a).unwrap();
        assert_eq!(
            two.leave(grant, &*a),
            Err(SyncError::ForeignGrant { grant: BlockId(1), block: BlockId(2) })
        );
        assert_eq!(one.holder(), Some(LocoId(1)));
    }

    #[test]
    fn leaving_with_someone_elses_grant_is_rejected() {
        let (s, _) = section(1);
        let a = TestLoco::new(1);
        let b = TestLoco::new(2);
        let grant = s.access(&*a).unwrap();
        assert_eq!(
            s.leave(grant, &*b),
            Err(SyncError::NotHolding {
                loco:   LocoId(2),
                block:  BlockId(1),
                holder: Some(LocoId(1)),
            })
        );
        assert_eq!(s.holder(), Some(LocoId(1)));
    }

    #[test]
    fn leave_wakes_only_the_parked_waiter() {
        let (s, _) = section(1);
        let a = TestLoco::new(1);
        let b = TestLoco::new(2);
        let grant = s.access(&*a).unwrap();

        let waiter = {
            let (s, b) = (Arc::clone(&s), Arc::clone(&b));
            thread::spawn(move || s.access(&*b))
        };
        eventually("b parked", || s.waiting() == Some(LocoId(2)));
        s.leave(grant, &*a).unwrap();
        let grant_b = waiter.join().unwrap().unwrap();

        // a must now wait for b like anyone else.
        let again = {
            let (s, a) = (Arc::clone(&s), Arc::clone(&a));
            thread::spawn(move || s.access(&*a))
        };
        eventually("a parked", || s.waiting() == Some(LocoId(1)));
        assert_eq!(s.holder(), Some(LocoId(2)));

        s.leave(grant_b, &*b).unwrap();
        let grant_a = again.join().unwrap().unwrap();
        assert_eq!(grant_a.loco(), LocoId(1));
        s.leave(grant_a, &*a).unwrap();
    }
}

// ── Station rendezvous ────────────────────────────────────────────────────────

#[cfg(test)]
mod station {
    use super::*;

    #[test]
    fn second_arrival_departs_first_holding_the_block() {
        let (s, events) = section(1);
        let a = TestLoco::new(1);
        let b = TestLoco::new(2);

        let first = {
            let (s, a) = (Arc::clone(&s), Arc::clone(&a));
            thread::spawn(move || s.stop_at_station(&*a))
        };
        eventually("a at station", || s.station_occupants() == 1);

        let high = s.stop_at_station(&*b).unwrap();
        let normal = first.join().unwrap().unwrap();

        assert_eq!(high.priority, Priority::High);
        assert_eq!(high.grant.as_ref().map(|g| g.loco()), Some(LocoId(2)));
        assert_eq!(normal.priority, Priority::Normal);
        assert!(normal.grant.is_none());
        assert_eq!(s.holder(), Some(LocoId(2)));
        assert_eq!(s.station_occupants(), 0);

        assert_eq!(a.commands(), ["stop", "start"]);
        assert_eq!(
            events.kinds_of(LocoId(1)),
            ["station_arrived", "station_parked", "departed"]
        );
        assert_eq!(
            events.kinds_of(LocoId(2)),
            ["station_arrived", "granted", "departed"]
        );

        if let Some(grant) = high.grant {
            s.leave(grant, &*b).unwrap();
        }
    }

    #[test]
    fn first_arrival_then_contends_for_the_block() {
        let (s, _) = section(1);
        let a = TestLoco::new(1);
        let b = TestLoco::new(2);

        let first = {
            let (s, a) = (Arc::clone(&s), Arc::clone(&a));
            thread::spawn(move || {
                let departure = s.stop_at_station(&*a)?;
                assert!(departure.grant.is_none());
                s.access(&*a)
            })
        };
        eventually("a at station", || s.station_occupants() == 1);
        let high = s.stop_at_station(&*b).unwrap();

        eventually("a parked on block", || s.waiting() == Some(LocoId(1)));
        assert_eq!(s.holder(), Some(LocoId(2)));

        let Some(grant_b) = high.grant else { panic!("high departure carries a grant") };
        s.leave(grant_b, &*b).unwrap();
        let grant_a = first.join().unwrap().unwrap();
        assert_eq!(s.holder(), Some(LocoId(1)));
        s.leave(grant_a, &*a).unwrap();
    }

    #[test]
    fn priority_alternates_with_arrival_order() {
        const LAPS: usize = 6;
        let (s, _) = section(1);
        let locos = [TestLoco::new(1), TestLoco::new(2)];
        let mut high_per_lap = Vec::with_capacity(LAPS);

        for lap in 0..LAPS {
            let (early, late) = if lap % 2 == 0 { (0, 1) } else { (1, 0) };
            let first = {
                let (s, l) = (Arc::clone(&s), Arc::clone(&locos[early]));
                thread::spawn(move || s.stop_at_station(&*l).map(|d| d.priority))
            };
            eventually("early arrival parked", || s.station_occupants() == 1);

            let departure = s.stop_at_station(&*locos[late]).unwrap();
            assert_eq!(first.join().unwrap(), Ok(Priority::Normal));
            assert_eq!(departure.priority, Priority::High);
            high_per_lap.push(locos[late].id());

            if let Some(grant) = departure.grant {
                s.leave(grant, &*locos[late]).unwrap();
            }
        }

        let expected: Vec<_> = (0..LAPS).map(|lap| LocoId(if lap % 2 == 0 { 2 } else { 1 })).collect();
        assert_eq!(high_per_lap, expected);
    }

    #[test]
    fn same_loco_twice_is_rejected() {
        let (s, _) = section(1);
        let a = TestLoco::new(1);
        let first = {
            let (s, a) = (Arc::clone(&s), Arc::clone(&a));
            thread::spawn(move || s.stop_at_station(&*a).map(|d| d.priority))
        };
        eventually("a at station", || s.station_occupants() == 1);

        assert_eq!(
            s.stop_at_station(&*a).map(|d| d.priority),
            Err(SyncError::AlreadyAtStation { loco: LocoId(1), block: BlockId(1) })
        );

        s.shutdown();
        assert_eq!(first.join().unwrap(), Err(SyncError::ShutDown(BlockId(1))));
    }

    #[test]
    fn third_arrival_during_grace_is_rejected() {
        let events: Arc<dyn EventSink> = Arc::new(Events::default());
        let config = ProtocolConfig { station_grace_ms: 60_000 };
        let s = Arc::new(SharedSection::new(BlockId(1), &config, events));
        let [a, b, c] = [TestLoco::new(1), TestLoco::new(2), TestLoco::new(3)];

        let first = {
            let (s, a) = (Arc::clone(&s), Arc::clone(&a));
            thread::spawn(move || s.stop_at_station(&*a).map(|d| d.priority))
        };
        eventually("a at station", || s.station_occupants() == 1);
        let second = {
            let (s, b) = (Arc::clone(&s), Arc::clone(&b));
            thread::spawn(move || s.stop_at_station(&*b).map(|d| d.priority))
        };
        eventually("b resolving", || s.station_occupants() == 2);

        assert_eq!(
            s.stop_at_station(&*c).map(|d| d.priority),
            Err(SyncError::StationOverbooked { loco: LocoId(3), block: BlockId(1) })
        );

        // Shutdown cuts the grace period short and releases both.
        s.shutdown();
        assert_eq!(second.join().unwrap(), Err(SyncError::ShutDown(BlockId(1))));
        assert_eq!(first.join().unwrap(), Err(SyncError::ShutDown(BlockId(1))));
    }

    #[test]
    fn grace_period_delays_the_release() {
        let events: Arc<dyn EventSink> = Arc::new(Events::default());
        let config = ProtocolConfig { station_grace_ms: 50 };
        let s = Arc::new(SharedSection::new(BlockId(1), &config, events));
        let (a, b) = (TestLoco::new(1), TestLoco::new(2));

        let first = {
            let (s, a) = (Arc::clone(&s), Arc::clone(&a));
            thread::spawn(move || s.stop_at_station(&*a).map(|d| d.priority))
        };
        eventually("a at station", || s.station_occupants() == 1);

        let started = Instant::now();
        let departure = s.stop_at_station(&*b).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(departure.priority, Priority::High);
        assert_eq!(first.join().unwrap(), Ok(Priority::Normal));
        if let Some(grant) = departure.grant {
            s.leave(grant, &*b).unwrap();
        }
    }
}

// ── Shutdown ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod shutdown {
    use super::*;

    #[test]
    fn shutdown_unblocks_a_parked_access() {
        let (s, _) = section(1);
        let a = TestLoco::new(1);
        let b = TestLoco::new(2);
        let grant = s.access(&*a).unwrap();

        let waiter = {
            let (s, b) = (Arc::clone(&s), Arc::clone(&b));
            thread::spawn(move || s.access(&*b))
        };
        eventually("b parked", || s.waiting() == Some(LocoId(2)));

        s.shutdown();
        let err = waiter.join().unwrap().unwrap_err();
        assert!(err.is_shutdown());
        assert_eq!(s.waiting(), None);

        // The holder can still give the block back.
        s.leave(grant, &*a).unwrap();
    }

    #[test]
    fn calls_after_shutdown_fail_fast() {
        let (s, _) = section(4);
        let a = TestLoco::new(1);
        s.shutdown();
        assert_eq!(s.access(&*a), Err(SyncError::ShutDown(BlockId(4))));
        assert_eq!(
            s.stop_at_station(&*a).map(|d| d.priority),
            Err(SyncError::ShutDown(BlockId(4)))
        );
    }

    #[test]
    fn protocol_violations_are_not_shutdowns() {
        assert!(!SyncError::UnknownBlock(BlockId(1)).is_shutdown());
        assert!(
            !SyncError::AlreadyHolding { loco: LocoId(1), block: BlockId(1) }.is_shutdown()
        );
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod registry {
    use super::*;

    fn registry(blocks: &[u32]) -> SectionRegistry {
        SectionRegistry::new(
            blocks.iter().copied().map(BlockId),
            &ProtocolConfig::immediate(),
            Arc::new(Events::default()),
        )
    }

    #[test]
    fn one_section_per_block() {
        let r = registry(&[2, 1, 2]);
        assert_eq!(r.len(), 2);
        let ids: Vec<_> = r.iter().map(|s| s.block()).collect();
        assert_eq!(ids, [BlockId(1), BlockId(2)]);
        assert!(Arc::ptr_eq(&r.get(BlockId(1)).unwrap(), &r.get(BlockId(1)).unwrap()));
    }

    #[test]
    fn unknown_block() {
        let r = registry(&[1]);
        assert_eq!(r.get(BlockId(9)).err(), Some(SyncError::UnknownBlock(BlockId(9))));
    }

    #[test]
    fn shutdown_all_reaches_every_section() {
        let r = registry(&[1, 2]);
        r.shutdown_all();
        let a = TestLoco::new(1);
        for s in r.iter() {
            assert!(s.access(&*a).unwrap_err().is_shutdown());
        }
    }
}

// ── Reference scenario ────────────────────────────────────────────────────────

/// One shared block (warn 10, enter 11, exit 12); stations {1,2} and {5,6}.
/// A reaches the station first, B second.
#[cfg(test)]
mod scenario {
    use super::*;

    #[test]
    fn late_arrival_leads_and_early_arrival_waits_for_the_block() {
        let (s, events) = section(1);
        let a = TestLoco::new(1);
        let b = TestLoco::new(2);

        let a_thread = {
            let (s, a) = (Arc::clone(&s), Arc::clone(&a));
            thread::spawn(move || {
                let departure = s.stop_at_station(&*a)?;
                // a: warn 10 reached while b still holds the block.
                let grant = s.access(&*a)?;
                Ok::<_, SyncError>((departure.priority, grant))
            })
        };
        eventually("a at station", || s.station_occupants() == 1);

        let departure = s.stop_at_station(&*b).unwrap();
        assert_eq!(departure.priority, Priority::High);
        eventually("a blocked on access", || s.waiting() == Some(LocoId(1)));

        // b: enter 11, exit 12 → leave.
        let Some(grant_b) = departure.grant else { panic!("b must hold the block") };
        s.leave(grant_b, &*b).unwrap();

        let (priority_a, grant_a) = a_thread.join().unwrap().unwrap();
        assert_eq!(priority_a, Priority::Normal);
        assert_eq!(grant_a.loco(), LocoId(1));
        assert_eq!(
            events.grant_order(),
            [
                ("granted", LocoId(2)),
                ("released", LocoId(2)),
                ("granted", LocoId(1)),
            ]
        );
        s.leave(grant_a, &*a).unwrap();
    }
}
