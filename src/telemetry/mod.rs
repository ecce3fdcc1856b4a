//! Telemetry task — serialises game events or buffers them offline.
//!
//! Single-threaded loop at a 10 ms cadence. Each iteration:
//!
//! 1. Connectivity timeout: 60 s with no received byte drops the link.
//! 2. Identify handshake: on a latched `I`, mark the link up, send the
//!    identify frame, then flush the offline ring in FIFO order.
//!    Identify goes *first* so the host can attribute the flushed events
//!    to this device before it sees them.
//! 3. Drain the event queue: transmit while connected, otherwise park
//!    events in the ring (overwrite-oldest).
//!
//! While the link is up an event is never silently dropped here: a failed
//! transmit flips the link down and the event lands in the ring instead.
//! The ring itself is single-owner — only this task touches it.

pub mod frames;
pub mod ring;
pub mod transport;

use log::{debug, info, warn};

use crate::app::events::GameEvent;
use crate::app::ports::{Clock, EventSource};
use crate::config::{AGENT_TIMEOUT_MS, TELEMETRY_PERIOD_MS};
use crate::dispatch::ConnectionFlags;
use frames::Frame;
use ring::EventRing;
use transport::Transport;

pub struct TelemetryTask<'a, T: Transport, E: EventSource> {
    transport: T,
    events: E,
    ring: EventRing,
    conn: &'a ConnectionFlags,
    device_id: &'a str,
}

impl<'a, T: Transport, E: EventSource> TelemetryTask<'a, T, E> {
    pub fn new(transport: T, events: E, conn: &'a ConnectionFlags, device_id: &'a str) -> Self {
        Self {
            transport,
            events,
            ring: EventRing::new(),
            conn,
            device_id,
        }
    }

    /// Run forever at the telemetry cadence.
    pub fn run(&mut self, clock: &mut impl Clock) -> ! {
        info!("telemetry task up (device {})", self.device_id);
        loop {
            self.service(clock.now_ms());
            clock.delay_ms(TELEMETRY_PERIOD_MS);
        }
    }

    /// One loop iteration, separated from `run` so tests can drive time.
    pub fn service(&mut self, now_ms: u32) {
        if self.conn.is_connected()
            && now_ms.wrapping_sub(self.conn.last_seen_ms()) > AGENT_TIMEOUT_MS
        {
            info!("agent silent for {} ms, buffering", AGENT_TIMEOUT_MS);
            self.conn.set_connected(false);
        }

        if self.conn.take_identify() {
            self.conn.set_connected(true);
            self.conn.touch(now_ms);
            self.send_identify();
            self.flush_ring();
        }

        while let Some(event) = self.events.poll() {
            if self.conn.is_connected() {
                if !self.send_event(&event) {
                    self.buffer(event);
                }
            } else {
                self.buffer(event);
            }
        }
    }

    /// Buffered events pending flush (test hook and diagnostics).
    pub fn buffered(&self) -> usize {
        self.ring.len()
    }

    // ── Internal ──────────────────────────────────────────────

    fn send_identify(&mut self) {
        let frame = Frame::Identify {
            device_id: self.device_id,
        };
        if !self.send_frame(&frame) {
            warn!("identify transmit failed");
        }
    }

    /// Drain the ring over the transport, oldest first. On a transmit
    /// failure the event is pushed back to the head so FIFO order holds
    /// for the next handshake.
    fn flush_ring(&mut self) {
        let total = self.ring.len();
        while let Some(event) = self.ring.pop() {
            if !self.send_event(&event) {
                if !self.ring.unpop(event) {
                    warn!("buffered event lost during failed flush");
                }
                return;
            }
        }
        if total > 0 {
            info!("flushed {} buffered events", total);
        }
    }

    /// Returns `false` on failure, after marking the link down.
    fn send_event(&mut self, event: &GameEvent) -> bool {
        self.send_frame(&Frame::from_event(event))
    }

    fn send_frame(&mut self, frame: &Frame<'_>) -> bool {
        let line = match frame.to_line() {
            Ok(line) => line,
            Err(e) => {
                warn!("frame serialisation failed: {}", e);
                return false;
            }
        };
        let sent = self
            .transport
            .write(line.as_bytes())
            .and_then(|()| self.transport.flush());
        match sent {
            Ok(()) => true,
            Err(e) => {
                warn!("serial transmit failed: {:?}, buffering", e);
                self.conn.set_connected(false);
                false
            }
        }
    }

    fn buffer(&mut self, event: GameEvent) {
        if self.ring.push(event) {
            debug!("offline ring full, oldest event evicted");
        }
    }
}
