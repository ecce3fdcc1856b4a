//! Inter-task queues and the pause notification.
//!
//! Uses `embassy-sync` bounded channels to bridge the dispatcher (interrupt
//! context) with the game task, and the game task with telemetry. The
//! channels are statics so the dispatcher can reach them without heap
//! allocation or locks.
//!
//! ```text
//! ┌────────────┐  Command   ┌───────────┐  GameEvent  ┌─────────────┐
//! │ Dispatcher │───────────▶│ Game task │────────────▶│ Telemetry   │
//! │ (ISR ctx)  │            │           │             │ task        │
//! └────────────┘            └───────────┘             └─────────────┘
//!        │ pause signal  ┌──────────────────┐
//!        └──────────────▶│ Pause controller │
//!                        └──────────────────┘
//! ```
//!
//! Both queues are non-blocking on the producer side: a full command queue
//! drops the byte (commands are user-driven and rare), a full event queue
//! drops the event (telemetry is best-effort). The pause signal coalesces —
//! one pending notification is enough.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use log::debug;

use crate::app::commands::Command;
use crate::app::events::GameEvent;
use crate::app::ports::{CommandSource, EventSink, EventSource};
use crate::config::{CMD_QUEUE_DEPTH, EVENT_QUEUE_DEPTH};

/// Dispatcher → game task. Enqueued from interrupt context.
pub static CMD_QUEUE: Channel<CriticalSectionRawMutex, Command, CMD_QUEUE_DEPTH> = Channel::new();

/// Game task → telemetry task.
pub static EVENT_QUEUE: Channel<CriticalSectionRawMutex, GameEvent, EVENT_QUEUE_DEPTH> =
    Channel::new();

/// Pause toggle notification, dispatcher → pause controller. Single-slot
/// and coalescing by design.
pub static PAUSE_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Enqueue a command from the dispatcher. Returns `false` when the queue
/// is full and the command was dropped.
pub fn send_command(cmd: Command) -> bool {
    CMD_QUEUE.try_send(cmd).is_ok()
}

/// Wake the pause controller. Safe from interrupt context.
pub fn request_pause() {
    PAUSE_SIGNAL.signal(());
}

/// Block the calling task until a pause notification arrives. Consecutive
/// signals before the wait coalesce into one wake.
pub fn wait_pause() {
    futures_lite::future::block_on(PAUSE_SIGNAL.wait());
}

// ───────────────────────────────────────────────────────────────
// Port adapters over the static queues
// ───────────────────────────────────────────────────────────────

/// [`CommandSource`] draining [`CMD_QUEUE`] — handed to the game task.
pub struct QueueCommandSource;

impl CommandSource for QueueCommandSource {
    fn poll(&mut self) -> Option<Command> {
        CMD_QUEUE.try_receive().ok()
    }
}

/// [`EventSink`] feeding [`EVENT_QUEUE`] — handed to the game task.
/// Drop-on-full: gameplay never blocks on telemetry.
pub struct QueueEventSink;

impl EventSink for QueueEventSink {
    fn emit(&mut self, event: GameEvent) {
        if EVENT_QUEUE.try_send(event).is_err() {
            debug!("event queue full, dropping {:?}", event);
        }
    }
}

/// [`EventSource`] draining [`EVENT_QUEUE`] — handed to the telemetry task.
pub struct QueueEventSource;

impl EventSource for QueueEventSource {
    fn poll(&mut self) -> Option<GameEvent> {
        EVENT_QUEUE.try_receive().ok()
    }
}
