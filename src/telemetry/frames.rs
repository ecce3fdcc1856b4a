//! Wire frames — one JSON object per line, device → host.
//!
//! Field order is canonical: the host-side relay splits on newlines and
//! pattern-matches on `event_type` first, so the tag always leads. The
//! frame names are part of the host contract and must not drift:
//!
//! ```text
//! {"event_type":"identify","device_id":"1a2b3c4d5e"}
//! {"event_type":"session_start"}
//! {"event_type":"pop_result","mole_id":3,"outcome":"hit","reaction_ms":245,"lives":5,"lvl":1,"pop":1,"pops_total":10}
//! {"event_type":"lvl_complete","lvl":1}
//! {"event_type":"session_end","win":false}
//! ```

use serde::Serialize;

use crate::app::events::{GameEvent, Outcome};

/// A single device → host frame.
#[derive(Debug, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum Frame<'a> {
    Identify {
        device_id: &'a str,
    },
    SessionStart,
    PopResult {
        mole_id: u8,
        outcome: Outcome,
        reaction_ms: u16,
        lives: u8,
        lvl: u8,
        pop: u8,
        pops_total: u8,
    },
    LvlComplete {
        lvl: u8,
    },
    SessionEnd {
        win: bool,
    },
}

impl Frame<'_> {
    pub fn from_event(event: &GameEvent) -> Frame<'static> {
        match *event {
            GameEvent::SessionStart => Frame::SessionStart,
            GameEvent::Pop(p) => Frame::PopResult {
                mole_id: p.mole,
                outcome: p.outcome,
                reaction_ms: p.reaction_ms,
                lives: p.lives,
                lvl: p.level,
                pop: p.pop_index,
                pops_total: p.pops_total,
            },
            GameEvent::LevelComplete { level } => Frame::LvlComplete { lvl: level },
            GameEvent::SessionEnd { won } => Frame::SessionEnd { win: won },
        }
    }

    /// Serialise to a newline-terminated line.
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}
