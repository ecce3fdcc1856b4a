//! Outbound game events.
//!
//! The game task emits these through the [`EventSink`](super::ports::EventSink)
//! port; the telemetry task serialises them into newline-delimited JSON or
//! parks them in the offline ring when the host relay is away. Everything is
//! `Copy` so events move through bounded queues without allocation.

use serde::Serialize;

/// How a single pop was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The matching button was pressed inside the window.
    Hit,
    /// A wrong button was pressed inside the window.
    Miss,
    /// The window expired with no press.
    Late,
}

/// Result of one mole appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopResult {
    /// Logical mole index, 0..=7.
    pub mole: u8,
    pub outcome: Outcome,
    /// Reaction time in ms — a multiple of the 5 ms poll slice; equals the
    /// full pop duration for `Late`.
    pub reaction_ms: u16,
    /// Lives remaining after this pop was scored.
    pub lives: u8,
    /// Level number, 1..=8.
    pub level: u8,
    /// 1-based pop number within the level.
    pub pop_index: u8,
    /// Pops in this level (currently always 10).
    pub pops_total: u8,
}

/// Structured events emitted by the game task, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A session has begun (lives reset, RNG reseeded).
    SessionStart,
    /// One pop was resolved.
    Pop(PopResult),
    /// All pops of a level were played.
    LevelComplete { level: u8 },
    /// The session is over.
    SessionEnd { won: bool },
}
