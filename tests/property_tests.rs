//! Property tests for the core data structures and the byte protocol.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32
//! targets. On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use proptest::prelude::*;

use whacamole::app::commands::Command;
use whacamole::app::events::{GameEvent, Outcome, PopResult};
use whacamole::config::RING_CAP;
use whacamole::dispatch::{dispatch_byte, ConnectionFlags};
use whacamole::game::rng::XorShift32;
use whacamole::telemetry::ring::EventRing;

fn marked(n: u16) -> GameEvent {
    GameEvent::Pop(PopResult {
        mole: 0,
        outcome: Outcome::Late,
        reaction_ms: n,
        lives: 0,
        level: 1,
        pop_index: 1,
        pops_total: 10,
    })
}

fn marker(e: &GameEvent) -> u16 {
    match e {
        GameEvent::Pop(p) => p.reaction_ms,
        _ => unreachable!("only marked events are pushed"),
    }
}

// ── Ring buffer invariants ────────────────────────────────────

proptest! {
    /// Count never exceeds capacity, and after any push sequence the
    /// survivors are exactly the newest suffix, in order.
    #[test]
    fn ring_keeps_newest_suffix(n in 0usize..300) {
        let mut ring = EventRing::new();
        for i in 0..n {
            ring.push(marked(i as u16));
            prop_assert!(ring.len() <= RING_CAP);
        }
        prop_assert_eq!(ring.len(), n.min(RING_CAP));

        let drained: Vec<u16> = core::iter::from_fn(|| ring.pop()).map(|e| marker(&e)).collect();
        let expected: Vec<u16> = (n.saturating_sub(RING_CAP)..n).map(|i| i as u16).collect();
        prop_assert_eq!(drained, expected);
    }
}

// ── RNG bounds ────────────────────────────────────────────────

proptest! {
    /// Delays stay inside [250, 1000] and targets on the board for any
    /// non-zero seed, not just the session seed.
    #[test]
    fn rng_outputs_stay_in_bounds(seed in 1u32..) {
        let mut rng = XorShift32::new(seed);
        for _ in 0..64 {
            let d = rng.inter_pop_delay_ms();
            prop_assert!((250..=1000).contains(&d));
            prop_assert!(rng.pop_target() < 8);
        }
    }
}

// ── Command byte protocol ─────────────────────────────────────

proptest! {
    /// The wire parser is total and maps exactly the documented bytes.
    #[test]
    fn wire_parser_is_total(byte: u8) {
        match Command::from_wire(byte) {
            Some(Command::Reset) => prop_assert_eq!(byte, b'R'),
            Some(Command::Start) => prop_assert_eq!(byte, b'S'),
            Some(Command::SetLevel(n)) => {
                prop_assert!((1..=8).contains(&n));
                prop_assert_eq!(byte, b'0' + n);
            }
            None => prop_assert!(
                byte != b'R' && byte != b'S' && !(b'1'..=b'8').contains(&byte)
            ),
        }
    }

    /// The dispatcher never panics and refreshes the connectivity timer
    /// for every byte except `D`.
    #[test]
    fn dispatcher_timer_rule(bytes in proptest::collection::vec(any::<u8>(), 1..64)) {
        let conn = ConnectionFlags::new();
        conn.touch(u32::MAX); // sentinel that no real byte will store
        let mut queued = Vec::new();
        let mut pauses = 0u32;
        for (i, &byte) in bytes.iter().enumerate() {
            let now = i as u32;
            dispatch_byte(
                byte,
                now,
                &conn,
                &mut |cmd| { queued.push(cmd); true },
                &mut || pauses += 1,
            );
            if byte == b'D' {
                prop_assert_ne!(conn.last_seen_ms(), now);
            } else {
                prop_assert_eq!(conn.last_seen_ms(), now);
            }
        }
        // Everything queued must have come from a queueable byte.
        prop_assert_eq!(
            queued.len(),
            bytes
                .iter()
                .filter(|&&b| Command::from_wire(b).is_some())
                .count()
        );
    }
}
