//! Whac-A-Mole firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod channels;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod game;
pub mod pause;
pub mod pins;
pub mod telemetry;

// Hardware-facing modules; the actual implementations are guarded by cfg
// attributes inside, with deterministic simulation fallbacks.
pub mod adapters;
pub mod drivers;
