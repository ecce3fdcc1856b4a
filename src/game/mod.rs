//! Game task — the real-time automaton driving the LED/button panel.
//!
//! ```text
//!  IDLE ──[start cmd / any button]──▶ RUNNING ──[levels exhausted]──▶ win feedback ─┐
//!    ▲                                   │                                          │
//!    │                            [lives == 0]──▶ loss feedback ─┐                  │
//!    │                            [reset cmd]──▶ (no feedback) ──┤                  │
//!    └───────────────────────────────────────────────────────────┴──────────────────┘
//! ```
//!
//! The task is sequential code with **cooperative checkpoints**: at every
//! slice of the idle loader, before and after each inter-pop wait, and
//! after each pop, the command queue is drained and the latched intents
//! (reset, start, level change) are observed. Checkpoints return a
//! [`Flow`] sentinel so pop and level routines unwind cleanly instead of
//! re-testing flags all the way up. Cancellation latency is therefore one
//! polling slice: ≤ 10 ms while idle, ≤ 5 ms inside a pop window, and at
//! most one inter-pop delay otherwise.
//!
//! I²C policy: failures in the idle loop propagate out of the task;
//! failures during a session are not retried — a pop whose button byte
//! never reads back is scored `Late`, and animation writes are fire-and-
//! forget.

pub mod rng;

use log::{info, warn};

use crate::app::commands::Command;
use crate::app::events::{GameEvent, Outcome, PopResult};
use crate::app::ports::{Clock, CommandSource, EventSink, IoPort};
use crate::config::{
    DEBOUNCE_LIMIT_MS, DEBOUNCE_POLL_MS, IDLE_HOLD_SLICES, IDLE_SLICE_MS, NUM_LEVELS, NUM_MOLES,
    POPS_PER_LVL, POP_DURATIONS_MS, POP_POLL_MS, POST_SESSION_DELAY_MS, RNG_SEED, STARTING_LIVES,
};
use crate::error::Result;
use crate::pins::{self, ALL_LEDS_OFF, ALL_RELEASED};
use rng::XorShift32;

/// Verdict of a cooperative checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// Reset observed — abort the session.
    Abort,
    /// Level change observed — restart the level loop at this index.
    Switch(usize),
}

/// How a level run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelEnd {
    Complete,
    OutOfLives,
    Aborted,
    Switch(usize),
}

/// The game task state machine. Generic over its ports so the whole
/// automaton runs under host-side mocks.
pub struct GameTask<IO, CLK, CMD, SINK> {
    io: IO,
    clock: CLK,
    commands: CMD,
    sink: SINK,

    lives: u8,
    rng: XorShift32,
    /// Level index (0..8) the host last asked for; sticky across sessions.
    requested_level_idx: usize,
    level_change_pending: bool,
    reset_requested: bool,
    start_requested: bool,
    reset_abort_session: bool,
}

impl<IO, CLK, CMD, SINK> GameTask<IO, CLK, CMD, SINK>
where
    IO: IoPort,
    CLK: Clock,
    CMD: CommandSource,
    SINK: EventSink,
{
    pub fn new(io: IO, clock: CLK, commands: CMD, sink: SINK) -> Self {
        Self {
            io,
            clock,
            commands,
            sink,
            lives: STARTING_LIVES,
            rng: XorShift32::new(RNG_SEED),
            requested_level_idx: 0,
            level_change_pending: false,
            reset_requested: false,
            start_requested: false,
            reset_abort_session: false,
        }
    }

    /// Drive the automaton forever: idle loader → session → idle.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.idle_loop()?;
            self.run_session()?;
        }
    }

    // ── Idle ──────────────────────────────────────────────────

    /// Animate the single-LED loader until a session should begin.
    ///
    /// Each LED holds for 50 × 10 ms slices; every slice drains the
    /// command queue and then acts on at most one exit condition, in
    /// priority order: a reset is consumed and holds the slice (a start
    /// latched in the same batch fires on the *next* slice), a start
    /// wins over a button press.
    pub fn idle_loop(&mut self) -> Result<()> {
        info!("idle: loader running, waiting for start");
        let mut led = 0usize;
        loop {
            self.io.write_leds(pins::led_mask(led))?;
            for _ in 0..IDLE_HOLD_SLICES {
                self.drain_commands();
                if self.reset_requested {
                    // Nothing to abort while idle; consume and keep looping.
                    self.reset_requested = false;
                } else if self.start_requested {
                    self.start_requested = false;
                    self.io.write_leds(ALL_LEDS_OFF)?;
                    return Ok(());
                } else if self.io.read_buttons()? != ALL_RELEASED {
                    self.io.write_leds(ALL_LEDS_OFF)?;
                    return Ok(());
                }
                self.clock.delay_ms(IDLE_SLICE_MS);
            }
            led = (led + 1) % NUM_MOLES;
        }
    }

    // ── Session ───────────────────────────────────────────────

    /// Play one full session: levels of pops until the lives run out, the
    /// last level completes, or a reset aborts.
    pub fn run_session(&mut self) -> Result<()> {
        self.lives = STARTING_LIVES;
        self.rng = XorShift32::new(RNG_SEED);
        self.drain_commands();
        let mut level_idx = self.requested_level_idx.min(NUM_LEVELS - 1);
        self.level_change_pending = false;
        self.reset_requested = false;
        self.start_requested = false;
        self.reset_abort_session = false;

        self.sink.emit(GameEvent::SessionStart);
        info!("session start at level {}", level_idx + 1);

        let mut won = false;
        loop {
            match self.run_level(level_idx) {
                LevelEnd::Complete => {
                    self.sink.emit(GameEvent::LevelComplete {
                        level: (level_idx + 1) as u8,
                    });
                    self.drain_commands();
                    if self.reset_requested {
                        self.reset_requested = false;
                        self.reset_abort_session = true;
                        break;
                    }
                    if level_idx + 1 == NUM_LEVELS {
                        won = true;
                        break;
                    }
                    if self.level_change_pending {
                        self.level_change_pending = false;
                        if self.requested_level_idx != level_idx {
                            level_idx = self.requested_level_idx;
                            continue;
                        }
                    }
                    level_idx += 1;
                }
                LevelEnd::OutOfLives => break,
                LevelEnd::Aborted => {
                    self.reset_abort_session = true;
                    break;
                }
                LevelEnd::Switch(next) => level_idx = next,
            }
        }

        if won {
            info!("session won");
            self.sink.emit(GameEvent::SessionEnd { won: true });
            self.clock.delay_ms(500);
            self.flash_all(100, 50, 50);
        } else {
            info!(
                "session lost ({})",
                if self.reset_abort_session { "reset" } else { "out of lives" }
            );
            self.sink.emit(GameEvent::SessionEnd { won: false });
            if !self.reset_abort_session {
                self.clock.delay_ms(500);
                self.flash_all(3, 500, 500);
            }
        }

        if !self.reset_abort_session {
            self.clock.delay_ms(POST_SESSION_DELAY_MS);
        }
        Ok(())
    }

    /// Play one level: the level-display animation, then its pops.
    fn run_level(&mut self, level_idx: usize) -> LevelEnd {
        self.level_display(level_idx);
        let pops_total = POPS_PER_LVL[level_idx];
        for pop_idx in 0..pops_total {
            match self.checkpoint(level_idx) {
                Flow::Abort => return LevelEnd::Aborted,
                Flow::Switch(next) => return LevelEnd::Switch(next),
                Flow::Continue => {}
            }

            let wait = self.rng.inter_pop_delay_ms();
            self.clock.delay_ms(wait);

            match self.checkpoint(level_idx) {
                Flow::Abort => return LevelEnd::Aborted,
                Flow::Switch(next) => return LevelEnd::Switch(next),
                Flow::Continue => {}
            }

            let result = self.run_pop(level_idx, pop_idx, pops_total);
            self.sink.emit(GameEvent::Pop(result));
            if result.outcome != Outcome::Hit {
                self.flash_all(1, 100, 100);
                if self.lives == 0 {
                    return LevelEnd::OutOfLives;
                }
            }

            match self.checkpoint(level_idx) {
                Flow::Abort => return LevelEnd::Aborted,
                Flow::Switch(next) => return LevelEnd::Switch(next),
                Flow::Continue => {}
            }
        }
        LevelEnd::Complete
    }

    /// One mole appearance. Absorbs I²C errors: a window during which the
    /// button byte never reads back scores `Late`.
    fn run_pop(&mut self, level_idx: usize, pop_idx: u8, pops_total: u8) -> PopResult {
        self.debounce();

        let target = self.rng.pop_target();
        let duration = POP_DURATIONS_MS[level_idx];
        let _ = self.io.write_leds(pins::led_mask(target as usize));

        let mut elapsed: u16 = 0;
        let (outcome, reaction_ms) = loop {
            if elapsed >= duration {
                break (Outcome::Late, duration);
            }
            self.clock.delay_ms(POP_POLL_MS);
            elapsed += POP_POLL_MS as u16;
            match self.io.read_buttons() {
                Ok(byte) if byte != ALL_RELEASED => {
                    let outcome = if byte & pins::btn_mask(target as usize) == 0 {
                        Outcome::Hit
                    } else {
                        Outcome::Miss
                    };
                    break (outcome, elapsed);
                }
                // All released, or a transient read fault: keep polling.
                _ => {}
            }
        };
        let _ = self.io.write_leds(ALL_LEDS_OFF);

        if outcome != Outcome::Hit {
            self.lives = self.lives.saturating_sub(1);
        }
        PopResult {
            mole: target,
            outcome,
            reaction_ms,
            lives: self.lives,
            level: (level_idx + 1) as u8,
            pop_index: pop_idx + 1,
            pops_total,
        }
    }

    /// Wait (bounded) for the player to let go of everything before the
    /// next pop, so a held button from the previous pop cannot score.
    fn debounce(&mut self) {
        let mut waited = 0u32;
        loop {
            if matches!(self.io.read_buttons(), Ok(ALL_RELEASED)) {
                return;
            }
            if waited >= DEBOUNCE_LIMIT_MS {
                return;
            }
            self.clock.delay_ms(DEBOUNCE_POLL_MS);
            waited += DEBOUNCE_POLL_MS;
        }
    }

    // ── Cooperative checkpoints ───────────────────────────────

    /// Drain the command queue and latch intents onto the task state.
    /// A reset supersedes anything else already latched.
    fn drain_commands(&mut self) {
        while let Some(cmd) = self.commands.poll() {
            match cmd {
                Command::Reset => {
                    self.reset_requested = true;
                    self.level_change_pending = false;
                    self.start_requested = false;
                }
                Command::Start => self.start_requested = true,
                Command::SetLevel(n) => {
                    self.requested_level_idx = (n as usize - 1).min(NUM_LEVELS - 1);
                    self.level_change_pending = true;
                }
            }
        }
    }

    /// Observe latched intents mid-session.
    fn checkpoint(&mut self, level_idx: usize) -> Flow {
        self.drain_commands();
        // A start while already running is meaningless; drop it so it
        // cannot leak into the next idle loop.
        self.start_requested = false;
        if self.reset_requested {
            self.reset_requested = false;
            return Flow::Abort;
        }
        if self.level_change_pending {
            self.level_change_pending = false;
            if self.requested_level_idx != level_idx {
                return Flow::Switch(self.requested_level_idx);
            }
        }
        Flow::Continue
    }

    // ── Animations ────────────────────────────────────────────

    /// Announce the level: light `level + 1` LEDs, flash them three
    /// times, then a short beat of darkness before the first pop.
    fn level_display(&mut self, level_idx: usize) {
        let bar = pins::led_bar_mask(level_idx + 1);
        let _ = self.io.write_leds(bar);
        self.clock.delay_ms(1000);
        for _ in 0..3 {
            let _ = self.io.write_leds(ALL_LEDS_OFF);
            self.clock.delay_ms(500);
            let _ = self.io.write_leds(bar);
            self.clock.delay_ms(500);
        }
        let _ = self.io.write_leds(ALL_LEDS_OFF);
        self.clock.delay_ms(500);
    }

    fn flash_all(&mut self, times: u32, on_ms: u32, off_ms: u32) {
        for _ in 0..times {
            if self.io.write_leds(0xFF).is_err() {
                warn!("LED flash write failed");
            }
            self.clock.delay_ms(on_ms);
            let _ = self.io.write_leds(ALL_LEDS_OFF);
            self.clock.delay_ms(off_ms);
        }
    }
}
