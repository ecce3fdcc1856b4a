//! Unified error types for the game firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! bootstrap path's error handling uniform. All variants are `Copy` so they
//! can be passed through the game loop without allocation.
//!
//! Runtime policy: initialisation errors bubble up and halt the system
//! before any task starts. I²C errors propagate out of the idle loop but
//! are absorbed during a running session (a pop whose button byte cannot be
//! read is scored `Late`). Queue-full and ring-eviction conditions are not
//! errors at all — dropped commands/events and evicted buffer entries are
//! deliberate policy, visible only in debug logs.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An I²C transaction with the GPIO expander failed.
    I2c(I2cError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I2c(e) => write!(f, "i2c: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// I²C errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cError {
    /// Read from the input expander failed or timed out.
    ReadFailed,
    /// Write to the output expander failed or timed out.
    WriteFailed,
    /// The bus driver rejected the transaction (not installed, busy).
    BusFault,
}

impl fmt::Display for I2cError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "expander read failed"),
            Self::WriteFailed => write!(f, "expander write failed"),
            Self::BusFault => write!(f, "bus fault"),
        }
    }
}

impl From<I2cError> for Error {
    fn from(e: I2cError) -> Self {
        Self::I2c(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
