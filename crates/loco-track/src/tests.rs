//! Unit tests for loco-track.

use std::thread;
use std::time::Duration;

use loco_core::{ContactId, Direction, JunctionId, JunctionSetting, LocoId, RunConfig};

use crate::{
    ContactSource, JunctionActuator, LayoutControl, Locomotive, TrackError, TrackEvent, TrackSim,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn circuit(ids: &[u32]) -> Vec<ContactId> {
    ids.iter().copied().map(ContactId).collect()
}

fn instant_track() -> TrackSim {
    TrackSim::new(&RunConfig::instant(1))
}

// ── Contact waits ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod contacts {
    use super::*;

    #[test]
    fn moving_loco_reaches_contact_in_circuit_order() {
        let track = instant_track();
        let loco = track.add_loco(LocoId(1), circuit(&[1, 31, 21]));
        loco.start();
        loco.wait_for_contact(ContactId(21)).unwrap();
        assert_eq!(track.log().contacts_of(LocoId(1)), circuit(&[1, 31, 21]));
        assert_eq!(track.next_contact(LocoId(1)), Some(ContactId(1)));
    }

    #[test]
    fn circuit_wraps_around() {
        let track = instant_track();
        let loco = track.add_loco(LocoId(1), circuit(&[1, 31, 21]));
        loco.start();
        loco.wait_for_contact(ContactId(31)).unwrap();
        loco.wait_for_contact(ContactId(1)).unwrap();
        assert_eq!(track.log().contacts_of(LocoId(1)), circuit(&[1, 31, 21, 1]));
    }

    #[test]
    fn set_position_heads_for_front_contact() {
        let track = instant_track();
        let loco = track.add_loco(LocoId(2), circuit(&[5, 34, 24]));
        loco.set_position(ContactId(34), ContactId(5));
        loco.start();
        loco.wait_for_contact(ContactId(34)).unwrap();
        assert_eq!(track.log().contacts_of(LocoId(2)), circuit(&[34]));
    }

    #[test]
    fn contact_not_on_circuit_is_an_error() {
        let track = instant_track();
        let loco = track.add_loco(LocoId(1), circuit(&[1, 31, 21]));
        loco.start();
        assert_eq!(
            loco.wait_for_contact(ContactId(99)),
            Err(TrackError::NotOnCircuit { loco: LocoId(1), contact: ContactId(99) })
        );
    }

    #[test]
    fn stopped_loco_blocks_until_started() {
        let track = instant_track();
        let loco = track.add_loco(LocoId(1), circuit(&[1, 31]));
        let waiter = {
            let loco = loco.clone();
            thread::spawn(move || loco.wait_for_contact(ContactId(31)))
        };
        thread::sleep(Duration::from_millis(30));
        assert!(track.log().contacts_of(LocoId(1)).is_empty(), "stopped loco must not move");
        loco.start();
        waiter.join().unwrap().unwrap();
        assert_eq!(track.log().contacts_of(LocoId(1)), circuit(&[1, 31]));
    }

    #[test]
    fn close_unblocks_waiters() {
        let track = instant_track();
        let loco = track.add_loco(LocoId(1), circuit(&[1, 31]));
        let waiter = {
            let loco = loco.clone();
            thread::spawn(move || loco.wait_for_contact(ContactId(31)))
        };
        thread::sleep(Duration::from_millis(20));
        track.close();
        assert_eq!(waiter.join().unwrap(), Err(TrackError::Closed));
        assert!(track.is_closed());
    }

    #[test]
    fn close_interrupts_a_trip_in_progress() {
        let config = RunConfig { contact_interval_ms: 60_000, ..RunConfig::instant(1) };
        let track = TrackSim::new(&config);
        let loco = track.add_loco(LocoId(1), circuit(&[1, 31]));
        loco.set_speed(10);
        loco.start();
        let waiter = {
            let loco = loco.clone();
            thread::spawn(move || loco.wait_for_contact(ContactId(31)))
        };
        thread::sleep(Duration::from_millis(20));
        track.close();
        assert_eq!(waiter.join().unwrap(), Err(TrackError::Closed));
    }

    #[test]
    fn unschedulable_trip_waits_for_close() {
        let config = RunConfig { contact_interval_ms: u64::MAX, jitter_ms: 5, ..RunConfig::instant(1) };
        let track = TrackSim::new(&config);
        let loco = track.add_loco(LocoId(1), circuit(&[1, 31]));
        loco.set_speed(1);
        loco.start();
        let waiter = {
            let loco = loco.clone();
            thread::spawn(move || loco.wait_for_contact(ContactId(31)))
        };
        thread::sleep(Duration::from_millis(20));
        assert!(track.log().contacts_of(LocoId(1)).is_empty());
        track.close();
        assert_eq!(waiter.join().unwrap(), Err(TrackError::Closed));
    }
}

// ── Motion, junctions, layout ─────────────────────────────────────────────────

#[cfg(test)]
mod track {
    use super::*;

    #[test]
    fn motion_state_is_tracked() {
        let track = instant_track();
        let loco = track.add_loco(LocoId(1), circuit(&[1]));
        assert!(!track.is_moving(LocoId(1)));
        loco.set_speed(12);
        loco.lights_on();
        loco.start();
        loco.message("Ready!");
        assert!(track.is_moving(LocoId(1)));
        assert!(track.lights(LocoId(1)));
        assert_eq!(track.speed(LocoId(1)), Some(12));
        assert_eq!(track.message(LocoId(1)).as_deref(), Some("Ready!"));
        loco.stop();
        assert!(!track.is_moving(LocoId(1)));
    }

    #[test]
    fn junctions_are_recorded_in_order() {
        let track = instant_track();
        track.set_junction(JunctionSetting::diverted(21));
        track.set_junction(JunctionSetting::straight(21));
        assert_eq!(track.junction(JunctionId(21)), Some(Direction::Straight));
        let junctions: Vec<_> = track
            .log()
            .snapshot()
            .into_iter()
            .filter(|e| matches!(e, TrackEvent::Junction(_)))
            .collect();
        assert_eq!(junctions.len(), 2);
    }

    #[test]
    fn layout_lifecycle() {
        let track = instant_track();
        assert_eq!(track.layout(), None);
        track.select_layout("A");
        assert_eq!(track.layout().as_deref(), Some("A"));
        track.out_of_service();
        assert_eq!(track.layout(), None);
        assert_eq!(track.log().snapshot().last(), Some(&TrackEvent::OutOfService));
    }

    #[test]
    fn tracks_are_independent() {
        let track = instant_track();
        let a = track.add_loco(LocoId(1), circuit(&[1]));
        let other = instant_track();
        let b = other.add_loco(LocoId(2), circuit(&[5]));
        assert_eq!(a.id(), LocoId(1));
        assert_eq!(b.id(), LocoId(2));
        assert_eq!(other.speed(LocoId(1)), None);
    }
}
