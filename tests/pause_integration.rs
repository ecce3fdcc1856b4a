//! Integration test: pausing across an open pop window.
//!
//! Drives a real `GameTask` on its own thread with a paced clock whose
//! `delay_ms` parks on the pause gate — the same suspension point the
//! simulated `MonotonicClock` uses — while the real pause controller
//! consumes the pause signal. Virtual game time runs at 10× wall speed
//! and only advances through `delay_ms`, so the test can observe two
//! invariants directly:
//!
//! 1. once paused, the game stops consuming time (and produces no
//!    events) within one poll slice;
//! 2. the wall-clock interval spent paused never counts toward
//!    `reaction_ms` — the pop resumes exactly where it left off.
//!
//! The pause gate is process-wide, so this file holds a single test.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use whacamole::app::commands::Command;
use whacamole::app::events::{GameEvent, Outcome, PopResult};
use whacamole::app::ports::{Clock, CommandSource, EventSink, IoPort};
use whacamole::channels::request_pause;
use whacamole::config::{POP_DURATIONS_MS, POP_POLL_MS, RNG_SEED};
use whacamole::error::I2cError;
use whacamole::game::rng::XorShift32;
use whacamole::game::GameTask;
use whacamole::pause;
use whacamole::pins::{btn_mask, ALL_RELEASED};

/// 1 virtual ms = 100 µs wall time (10× speedup).
const US_PER_VIRTUAL_MS: u64 = 100;

struct SharedIo(Arc<AtomicU8>);

impl IoPort for SharedIo {
    fn read_buttons(&mut self) -> Result<u8, I2cError> {
        Ok(self.0.load(Ordering::SeqCst))
    }

    fn write_leds(&mut self, _byte: u8) -> Result<(), I2cError> {
        Ok(())
    }
}

/// Virtual clock: time advances only through `delay_ms`, which parks on
/// the pause gate first — a suspend always lands between slices.
struct PacedClock(Arc<AtomicU32>);

impl Clock for PacedClock {
    fn now_ms(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    fn delay_ms(&mut self, ms: u32) {
        pause::block_while_paused();
        thread::sleep(Duration::from_micros(ms as u64 * US_PER_VIRTUAL_MS));
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

struct SharedCommands(Arc<Mutex<VecDeque<Command>>>);

impl CommandSource for SharedCommands {
    fn poll(&mut self) -> Option<Command> {
        self.0.lock().unwrap().pop_front()
    }
}

struct SharedSink(Arc<Mutex<Vec<GameEvent>>>);

impl EventSink for SharedSink {
    fn emit(&mut self, event: GameEvent) {
        self.0.lock().unwrap().push(event);
    }
}

fn wait_until(mut cond: impl FnMut() -> bool, timeout: Duration, what: &str) {
    let deadline = Instant::now() + timeout;
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(2));
    }
}

fn press_byte(logical: u8) -> u8 {
    ALL_RELEASED & !btn_mask(logical as usize)
}

#[test]
fn paused_interval_does_not_count_toward_reaction_time() {
    pause::resume_game(); // known-open gate
    thread::spawn(|| {
        pause::controller_loop();
    });

    // Replay the engine's pop schedule: when the first window opens and
    // which mole it lights.
    let mut rng = XorShift32::new(RNG_SEED);
    let d1 = rng.inter_pop_delay_ms();
    let target1 = rng.pop_target();
    let level_display_ms = 1000 + 3 * (500 + 500) + 500;
    let open1 = level_display_ms + d1;

    let buttons = Arc::new(AtomicU8::new(ALL_RELEASED));
    let commands = Arc::new(Mutex::new(VecDeque::from([Command::Start])));
    let events: Arc<Mutex<Vec<GameEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let vnow = Arc::new(AtomicU32::new(0));

    let game_thread = thread::spawn({
        let buttons = buttons.clone();
        let commands = commands.clone();
        let events = events.clone();
        let vnow = vnow.clone();
        move || {
            let mut game = GameTask::new(
                SharedIo(buttons),
                PacedClock(vnow),
                SharedCommands(commands),
                SharedSink(events),
            );
            game.idle_loop().unwrap();
            game.run_session().unwrap();
        }
    });

    // Let the game get at least 50 virtual ms into the open pop window,
    // then pause it mid-pop via the real signal → controller → gate path.
    wait_until(
        || vnow.load(Ordering::SeqCst) >= open1 + 50,
        Duration::from_secs(10),
        "the first pop window to open",
    );
    request_pause();

    // Within one slice of the suspend, virtual time must freeze and no
    // pop may resolve, however long the wall clock keeps running.
    thread::sleep(Duration::from_millis(50));
    let frozen_at = vnow.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(300)); // ≈3000 virtual ms if running
    let still = vnow.load(Ordering::SeqCst);
    assert!(
        still.wrapping_sub(frozen_at) <= POP_POLL_MS,
        "paused game kept consuming time ({frozen_at} → {still})"
    );
    assert!(
        !events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, GameEvent::Pop(_))),
        "no pop may resolve while paused"
    );

    // Stage the correct press and a reset (observed at the checkpoint
    // after the pop), then resume.
    buttons.store(press_byte(target1), Ordering::SeqCst);
    commands.lock().unwrap().push_back(Command::Reset);
    request_pause();

    wait_until(
        || {
            events
                .lock()
                .unwrap()
                .iter()
                .any(|e| matches!(e, GameEvent::SessionEnd { .. }))
        },
        Duration::from_secs(10),
        "the session to wind down after the pop",
    );
    game_thread.join().unwrap();

    let events = events.lock().unwrap();
    let pop: PopResult = events
        .iter()
        .find_map(|e| match e {
            GameEvent::Pop(p) => Some(*p),
            _ => None,
        })
        .expect("the paused pop must still resolve after resume");

    assert_eq!(pop.mole, target1, "resume continues the same pop");
    assert_eq!(pop.level, 1);
    assert_eq!(pop.pop_index, 1);
    assert_eq!(pop.outcome, Outcome::Hit);
    assert_eq!(pop.reaction_ms % 5, 0);
    // The window is 1500 virtual ms and the pause alone burned ~3000
    // virtual ms of wall time: had the paused interval counted, this pop
    // would have gone Late at exactly 1500.
    assert!(
        (50..POP_DURATIONS_MS[0]).contains(&pop.reaction_ms),
        "reaction {} must reflect only unpaused polling",
        pop.reaction_ms
    );
    assert_eq!(*events.last().unwrap(), GameEvent::SessionEnd { won: false });
}
