//! One-shot hardware peripheral initialization.
//!
//! Brings up the I²C expander bus and puts the panel into a known state
//! (all LEDs dark, buttons readable). Called once from `main()` before
//! any task is spawned; a failure here is fatal and aborts bootstrap.

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    I2cBusFailed(i32),
    I2cDeviceFailed(i32),
    ExpanderProbeFailed,
    UartInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I2cBusFailed(rc) => write!(f, "I2C master bus init failed (rc={})", rc),
            Self::I2cDeviceFailed(rc) => write!(f, "I2C expander attach failed (rc={})", rc),
            Self::ExpanderProbeFailed => write!(f, "expander probe failed"),
            Self::UartInitFailed(rc) => write!(f, "UART driver install failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

use crate::drivers::expander;
use crate::pins::ALL_LEDS_OFF;
use log::info;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    expander::init()?;
    probe_panel()?;
    info!("hw_init: panel configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    probe_panel()?;
    info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

/// Blank the LEDs and take one button read so a dead bus is caught at
/// boot rather than mid-session.
fn probe_panel() -> Result<(), HwInitError> {
    if expander::write_outputs(ALL_LEDS_OFF).is_err() {
        return Err(HwInitError::ExpanderProbeFailed);
    }
    match expander::read_inputs() {
        Ok(_) => Ok(()),
        Err(_) => Err(HwInitError::ExpanderProbeFailed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_init_succeeds() {
        assert!(init_peripherals().is_ok());
    }

    #[test]
    fn errors_render_their_return_codes() {
        let msg = format!("{}", HwInitError::I2cBusFailed(-259));
        assert!(msg.contains("-259"));
    }
}
