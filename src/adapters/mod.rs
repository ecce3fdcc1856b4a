//! Driven adapters — the concrete side of the port traits.
//!
//! Everything ESP-IDF-specific is guarded by `#[cfg(target_os = "espidf")]`
//! inside each module, with deterministic simulation fallbacks so the
//! adapters compile and behave sensibly on the host.

pub mod device_id;
pub mod hardware;
pub mod serial;
pub mod time;
