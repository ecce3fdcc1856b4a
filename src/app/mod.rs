//! Application core — pure domain types, zero I/O.
//!
//! This module contains the vocabulary the tasks speak: commands coming in
//! from the serial link, events going out to the host, and the port traits
//! the game and telemetry tasks use to reach hardware and queues. All
//! interaction with peripherals happens through **port traits** defined in
//! [`ports`], keeping the game logic fully testable without a board.

pub mod commands;
pub mod events;
pub mod ports;
