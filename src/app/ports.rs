//! Port traits — the boundary between task logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GameTask / TelemetryTask
//! ```
//!
//! Driven adapters (the I²C expander, the monotonic clock, the static
//! queues) implement these traits. The game and telemetry tasks consume
//! them via generics, so the core logic never touches hardware and the
//! whole state machine runs under host-side mocks.

use crate::app::commands::Command;
use crate::app::events::GameEvent;
use crate::error::I2cError;

// ───────────────────────────────────────────────────────────────
// Board I/O port (driven adapter: expander ↔ game task)
// ───────────────────────────────────────────────────────────────

/// The 8-button / 8-LED panel behind the I²C GPIO expander.
pub trait IoPort {
    /// Read the raw button byte. Active-low: a cleared bit is a held
    /// button, `0xFF` means all released.
    fn read_buttons(&mut self) -> Result<u8, I2cError>;

    /// Write the raw LED byte. A set bit lights the LED; `0x00` is dark.
    fn write_leds(&mut self, byte: u8) -> Result<(), I2cError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time and cooperative delay.
///
/// `delay_ms` is the game task's only suspension point; the pause
/// controller's suspend lands between slices, so time spent suspended is
/// never credited to a reaction measurement.
pub trait Clock {
    /// Milliseconds since boot, wrapping at `u32::MAX` (~49 days).
    fn now_ms(&self) -> u32;

    /// Block the calling task for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Queue ports
// ───────────────────────────────────────────────────────────────

/// The game task emits structured [`GameEvent`]s through this port.
/// The production sink pushes into the bounded event queue and drops on
/// full (telemetry is best-effort); test sinks record into a `Vec`.
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

/// Non-blocking source of queued commands, drained at every cooperative
/// checkpoint of the game task.
pub trait CommandSource {
    fn poll(&mut self) -> Option<Command>;
}

/// Non-blocking source of game events, drained by the telemetry task.
pub trait EventSource {
    fn poll(&mut self) -> Option<GameEvent>;
}
