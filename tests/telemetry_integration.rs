//! Integration tests: telemetry task — buffering, flush ordering,
//! identify handshake, connectivity timeout, and JSON framing.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use whacamole::app::events::{GameEvent, Outcome, PopResult};
use whacamole::app::ports::EventSource;
use whacamole::config::{AGENT_TIMEOUT_MS, RING_CAP};
use whacamole::dispatch::ConnectionFlags;
use whacamole::telemetry::transport::Transport;
use whacamole::telemetry::TelemetryTask;

// ── Shared mock transport and event source ────────────────────

#[derive(Clone, Default)]
struct CaptureTransport {
    out: Rc<RefCell<String>>,
    fail: Rc<Cell<bool>>,
}

impl CaptureTransport {
    fn lines(&self) -> Vec<String> {
        self.out
            .borrow()
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl Transport for CaptureTransport {
    type Error = &'static str;

    fn write(&mut self, data: &[u8]) -> Result<(), &'static str> {
        if self.fail.get() {
            return Err("link down");
        }
        self.out
            .borrow_mut()
            .push_str(core::str::from_utf8(data).expect("frames are UTF-8"));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), &'static str> {
        Ok(())
    }
}

#[derive(Clone, Default)]
struct SharedEvents(Rc<RefCell<VecDeque<GameEvent>>>);

impl SharedEvents {
    fn push(&self, event: GameEvent) {
        self.0.borrow_mut().push_back(event);
    }
}

impl EventSource for SharedEvents {
    fn poll(&mut self) -> Option<GameEvent> {
        self.0.borrow_mut().pop_front()
    }
}

/// A pop event with a recognisable marker in `reaction_ms`.
fn marked(n: u16) -> GameEvent {
    GameEvent::Pop(PopResult {
        mole: (n % 8) as u8,
        outcome: Outcome::Hit,
        reaction_ms: n,
        lives: 5,
        level: 1,
        pop_index: 1,
        pops_total: 10,
    })
}

fn marker_of(line: &str) -> u16 {
    let value: serde_json::Value = serde_json::from_str(line).expect("well-formed JSON");
    value["reaction_ms"].as_u64().expect("pop_result line") as u16
}

struct Fixture {
    transport: CaptureTransport,
    events: SharedEvents,
    conn: ConnectionFlags,
}

impl Fixture {
    fn new() -> Self {
        Self {
            transport: CaptureTransport::default(),
            events: SharedEvents::default(),
            conn: ConnectionFlags::new(),
        }
    }

    fn task(&self) -> TelemetryTask<'_, CaptureTransport, SharedEvents> {
        TelemetryTask::new(
            self.transport.clone(),
            self.events.clone(),
            &self.conn,
            "adbeefcafe",
        )
    }
}

// ── Offline buffering and flush (S2) ──────────────────────────

#[test]
fn offline_events_buffer_then_flush_after_identify() {
    let fx = Fixture::new();
    let mut task = fx.task();

    for n in [10, 20, 30] {
        fx.events.push(marked(n));
    }
    task.service(0);

    assert!(fx.transport.lines().is_empty(), "no lines while offline");
    assert_eq!(task.buffered(), 3);

    fx.conn.request_identify();
    task.service(100);

    let lines = fx.transport.lines();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "{\"event_type\":\"identify\",\"device_id\":\"adbeefcafe\"}",
        "identify frame precedes the flushed backlog"
    );
    assert_eq!(
        lines[1..].iter().map(|l| marker_of(l)).collect::<Vec<_>>(),
        vec![10, 20, 30],
        "backlog flushes in emission order"
    );
    assert_eq!(task.buffered(), 0);
    assert!(fx.conn.is_connected());
}

// ── Ring overflow (S3) ────────────────────────────────────────

#[test]
fn overflow_delivers_exactly_the_last_hundred() {
    let fx = Fixture::new();
    let mut task = fx.task();

    for n in 0..150u16 {
        fx.events.push(marked(n));
    }
    task.service(0);
    assert_eq!(task.buffered(), RING_CAP);

    fx.conn.request_identify();
    task.service(10);

    let lines = fx.transport.lines();
    assert_eq!(lines.len(), 1 + RING_CAP);
    let markers: Vec<u16> = lines[1..].iter().map(|l| marker_of(l)).collect();
    let expected: Vec<u16> = (50..150).collect();
    assert_eq!(markers, expected, "only the newest 100, still in order");
}

// ── FIFO across the buffer/flush boundary ─────────────────────

#[test]
fn stream_order_survives_buffer_and_reconnect() {
    let fx = Fixture::new();
    let mut task = fx.task();

    fx.events.push(marked(1));
    fx.events.push(marked(2));
    task.service(0); // offline → buffered

    fx.conn.request_identify();
    fx.events.push(marked(3)); // arrives with the link already up
    task.service(10);

    let lines = fx.transport.lines();
    let markers: Vec<u16> = lines[1..].iter().map(|l| marker_of(l)).collect();
    assert_eq!(markers, vec![1, 2, 3]);
}

// ── Identify idempotence ──────────────────────────────────────

#[test]
fn double_identify_sends_two_frames_and_no_duplicates() {
    let fx = Fixture::new();
    let mut task = fx.task();

    fx.events.push(marked(7));
    task.service(0);

    fx.conn.request_identify();
    task.service(10);
    fx.conn.request_identify();
    task.service(20);

    let lines = fx.transport.lines();
    let identifies = lines
        .iter()
        .filter(|l| l.contains("\"identify\""))
        .count();
    assert_eq!(identifies, 2);
    let markers: Vec<u16> = lines
        .iter()
        .filter(|l| l.contains("pop_result"))
        .map(|l| marker_of(l))
        .collect();
    assert_eq!(markers, vec![7], "buffered events must not re-flush");
}

// ── Connectivity timeout ──────────────────────────────────────

#[test]
fn silence_beyond_timeout_forces_buffering() {
    let fx = Fixture::new();
    let mut task = fx.task();

    fx.conn.set_connected(true);
    fx.conn.touch(0);

    // At exactly the timeout the link holds.
    task.service(AGENT_TIMEOUT_MS);
    assert!(fx.conn.is_connected());

    // One tick beyond, it drops, and the next event is buffered.
    fx.events.push(marked(42));
    task.service(AGENT_TIMEOUT_MS + 1);
    assert!(!fx.conn.is_connected());
    assert!(fx.transport.lines().is_empty());
    assert_eq!(task.buffered(), 1);
}

// ── Transmit failure degrades to buffering ────────────────────

#[test]
fn write_failure_buffers_instead_of_dropping() {
    let fx = Fixture::new();
    let mut task = fx.task();

    fx.conn.set_connected(true);
    fx.conn.touch(0);
    fx.transport.fail.set(true);

    fx.events.push(marked(9));
    task.service(10);

    assert!(!fx.conn.is_connected(), "failed write drops the link");
    assert_eq!(task.buffered(), 1, "the event moves to the ring, not /dev/null");

    // Link restored: the event comes out on the next handshake.
    fx.transport.fail.set(false);
    fx.conn.request_identify();
    task.service(20);
    let lines = fx.transport.lines();
    assert_eq!(marker_of(&lines[1]), 9);
}

// ── JSON round-trip ───────────────────────────────────────────

#[test]
fn every_line_is_well_formed_and_round_trips() {
    let fx = Fixture::new();
    let mut task = fx.task();

    fx.conn.request_identify();
    fx.events.push(GameEvent::SessionStart);
    fx.events.push(marked(123));
    fx.events.push(GameEvent::LevelComplete { level: 2 });
    fx.events.push(GameEvent::SessionEnd { won: true });
    task.service(0);

    let lines = fx.transport.lines();
    assert_eq!(lines.len(), 5);
    for line in &lines {
        let parsed: serde_json::Value = serde_json::from_str(line).expect("well-formed JSON");
        let reserialised = serde_json::to_string(&parsed).unwrap();
        let reparsed: serde_json::Value = serde_json::from_str(&reserialised).unwrap();
        assert_eq!(parsed, reparsed);
        assert!(parsed["event_type"].is_string());
    }
    assert_eq!(
        lines[4],
        "{\"event_type\":\"session_end\",\"win\":true}",
        "win is a bare boolean literal"
    );
}
