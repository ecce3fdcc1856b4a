//! Canonical game tuning and system sizing constants.
//!
//! Single source of truth — every task references this module rather than
//! hard-coding timings or queue depths. The pop-duration table and lives
//! count define the difficulty curve and are shared with the host-side
//! analytics, so they must not drift.

// ---------------------------------------------------------------------------
// Game shape
// ---------------------------------------------------------------------------

/// Number of moles (LED / button pairs) on the board.
pub const NUM_MOLES: usize = 8;

/// Number of levels in a full session.
pub const NUM_LEVELS: usize = 8;

/// Lives at session start.
pub const STARTING_LIVES: u8 = 5;

/// Pops per level, indexed by level index 0..7.
pub const POPS_PER_LVL: [u8; NUM_LEVELS] = [10; NUM_LEVELS];

/// Pop window per level index, in milliseconds. The window shrinks as the
/// level rises; every entry is a multiple of the 5 ms poll slice.
pub const POP_DURATIONS_MS: [u16; NUM_LEVELS] = [1500, 1250, 1000, 750, 600, 500, 350, 275];

/// Inter-pop delay window (inclusive), in milliseconds.
pub const POP_DELAY_MIN_MS: u32 = 250;
pub const POP_DELAY_MAX_MS: u32 = 1000;

/// Fixed RNG seed. Reseeded at every session start so pop schedules are
/// reproducible against recorded sessions.
pub const RNG_SEED: u32 = 0xDEAD_BEEF;

// ---------------------------------------------------------------------------
// Polling cadences
// ---------------------------------------------------------------------------

/// Button poll slice during an open pop window. Bounds detection latency.
pub const POP_POLL_MS: u32 = 5;

/// Idle-loader slice; commands and buttons are sampled once per slice.
pub const IDLE_SLICE_MS: u32 = 10;

/// Slices the idle loader holds each LED (50 × 10 ms = 500 ms per LED).
pub const IDLE_HOLD_SLICES: u32 = 50;

/// Pre-pop debounce: poll every 10 ms until all buttons released…
pub const DEBOUNCE_POLL_MS: u32 = 10;

/// …or give up after 50 ms.
pub const DEBOUNCE_LIMIT_MS: u32 = 50;

/// Telemetry task loop period.
pub const TELEMETRY_PERIOD_MS: u32 = 10;

/// Pause before returning to the idle loader after a session.
pub const POST_SESSION_DELAY_MS: u32 = 2000;

// ---------------------------------------------------------------------------
// Queues and buffering
// ---------------------------------------------------------------------------

/// Game → telemetry event queue depth.
pub const EVENT_QUEUE_DEPTH: usize = 32;

/// Dispatcher → game command queue depth.
pub const CMD_QUEUE_DEPTH: usize = 8;

/// Offline event ring capacity. On overflow the oldest event is evicted.
pub const RING_CAP: usize = 100;

/// Host-relay connectivity timeout: no byte received for this long while
/// connected forces buffering mode.
pub const AGENT_TIMEOUT_MS: u32 = 60_000;

// ---------------------------------------------------------------------------
// Task priorities and stacks (FreeRTOS, higher number = more urgent)
// ---------------------------------------------------------------------------

/// Serial RX pump — drains the UART FIFO and runs the command dispatcher.
/// Above everything else so a `P` byte preempts gameplay immediately.
pub const PRIO_RX_PUMP: u8 = 18;

/// Pause controller — one step below the RX pump, above the game task so
/// a pause notification suspends the game within one scheduler tick.
pub const PRIO_PAUSE: u8 = 17;

/// Game task.
pub const PRIO_GAME: u8 = 16;

/// Telemetry task.
pub const PRIO_TELEMETRY: u8 = 15;

pub const STACK_KB_RX_PUMP: usize = 4;
pub const STACK_KB_PAUSE: usize = 4;
pub const STACK_KB_GAME: usize = 8;
pub const STACK_KB_TELEMETRY: usize = 12;
