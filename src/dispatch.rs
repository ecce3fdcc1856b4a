//! Command dispatcher — routes serial RX bytes in interrupt context.
//!
//! The serial RX pump calls [`on_rx_byte`] for every byte drained from the
//! UART FIFO. All non-trivial work is deferred: queueable commands go to
//! the command queue, pause becomes a task notification, identify and
//! disconnect are word-sized flag stores. The dispatcher is lock-free
//! against the tasks — its only shared writes are relaxed atomic stores
//! and ISR-safe channel sends, and the readers use relaxed loads.
//!
//! | Byte     | Effect                                   |
//! |----------|------------------------------------------|
//! | `P`      | Notify the pause controller              |
//! | `R`      | Enqueue `Command::Reset`                 |
//! | `S`      | Enqueue `Command::Start`                 |
//! | `1`..`8` | Enqueue `Command::SetLevel(n)`           |
//! | `I`      | Latch the identify request               |
//! | `D`      | Clear `agent_connected` (force buffering)|
//! | other    | Ignored                                  |
//!
//! Every byte except `D` refreshes the connectivity timer.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::debug;

use crate::app::commands::Command;
use crate::channels;

// ───────────────────────────────────────────────────────────────
// Connection state (shared island: dispatcher writes, telemetry reads)
// ───────────────────────────────────────────────────────────────

/// Serial-link connection state shared between the dispatcher (interrupt
/// context) and the telemetry task.
///
/// All fields are word-sized atomics accessed with relaxed ordering: the
/// flags carry no payload, and `last_command_tick` tolerates a one-tick
/// misread against the 60 s timeout.
pub struct ConnectionFlags {
    agent_connected: AtomicBool,
    identify_requested: AtomicBool,
    last_command_tick: AtomicU32,
}

impl ConnectionFlags {
    pub const fn new() -> Self {
        Self {
            agent_connected: AtomicBool::new(false),
            identify_requested: AtomicBool::new(false),
            last_command_tick: AtomicU32::new(0),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.agent_connected.load(Ordering::Relaxed)
    }

    pub fn set_connected(&self, connected: bool) {
        self.agent_connected.store(connected, Ordering::Relaxed);
    }

    pub fn request_identify(&self) {
        self.identify_requested.store(true, Ordering::Relaxed);
    }

    /// Consume a pending identify request, if any.
    pub fn take_identify(&self) -> bool {
        self.identify_requested.swap(false, Ordering::Relaxed)
    }

    /// Refresh the connectivity timer.
    pub fn touch(&self, now_ms: u32) {
        self.last_command_tick.store(now_ms, Ordering::Relaxed);
    }

    /// Tick of the most recent received byte (excluding `D`).
    pub fn last_seen_ms(&self) -> u32 {
        self.last_command_tick.load(Ordering::Relaxed)
    }
}

impl Default for ConnectionFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide connection state.
pub static CONN: ConnectionFlags = ConnectionFlags::new();

// ───────────────────────────────────────────────────────────────
// Byte routing
// ───────────────────────────────────────────────────────────────

/// Route one RX byte. Parameterised over its effects so the routing table
/// is testable without the static queues; production code goes through
/// [`on_rx_byte`].
pub fn dispatch_byte(
    byte: u8,
    now_ms: u32,
    conn: &ConnectionFlags,
    enqueue: &mut impl FnMut(Command) -> bool,
    notify_pause: &mut impl FnMut(),
) {
    // `D` declares the host gone; it must not refresh the timer it is
    // about to defeat.
    if byte != b'D' {
        conn.touch(now_ms);
    }

    match byte {
        b'P' => notify_pause(),
        b'I' => conn.request_identify(),
        b'D' => conn.set_connected(false),
        _ => {
            if let Some(cmd) = Command::from_wire(byte) {
                if !enqueue(cmd) {
                    debug!("command queue full, dropping {:?}", cmd);
                }
            }
        }
    }
}

/// Entry point for the serial RX pump. Interrupt-context safe.
pub fn on_rx_byte(byte: u8, now_ms: u32) {
    dispatch_byte(
        byte,
        now_ms,
        &CONN,
        &mut channels::send_command,
        &mut channels::request_pause,
    );
}
