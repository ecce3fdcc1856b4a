//! I²C GPIO expander driver — the button and LED bytes.
//!
//! The panel's 8 buttons hang off the input expander at 0x68 and the 8
//! LEDs off the output expander at 0x58, both on the standard-mode bus.
//! Transactions are blocking but short (well under 200 µs at 100 kHz for
//! a single byte), so they count as non-suspending for the game task's
//! timing analysis.
//!
//! Button byte is active-low (`0xFF` = all released); LED byte is
//! active-high (`0x00` = all dark). Logical→physical bit remaps live in
//! [`crate::pins`] — this driver moves raw bytes only.

use crate::error::I2cError;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init::HwInitError;

#[cfg(target_os = "espidf")]
mod imp {
    use super::*;
    use crate::pins;
    use esp_idf_svc::sys::*;
    use log::info;

    /// Per-transaction timeout. Generous; a healthy bus finishes a byte
    /// in microseconds.
    const XFER_TIMEOUT_MS: i32 = 20;

    static mut BUS: i2c_master_bus_handle_t = core::ptr::null_mut();
    static mut IN_DEV: i2c_master_dev_handle_t = core::ptr::null_mut();
    static mut OUT_DEV: i2c_master_dev_handle_t = core::ptr::null_mut();

    /// SAFETY: handles are written once by `init()` before any task
    /// starts; afterwards only the game task issues transactions.
    unsafe fn in_dev() -> i2c_master_dev_handle_t {
        unsafe { IN_DEV }
    }

    unsafe fn out_dev() -> i2c_master_dev_handle_t {
        unsafe { OUT_DEV }
    }

    pub fn init() -> Result<(), HwInitError> {
        let bus_cfg = i2c_master_bus_config_t {
            i2c_port: 0,
            sda_io_num: pins::I2C_SDA_GPIO,
            scl_io_num: pins::I2C_SCL_GPIO,
            glitch_ignore_cnt: 7,
            ..Default::default()
        };
        // SAFETY: one-shot init from main() before any task is spawned;
        // the handle statics are only written here.
        unsafe {
            let rc = i2c_new_master_bus(&bus_cfg, &raw mut BUS);
            if rc != ESP_OK as i32 {
                return Err(HwInitError::I2cBusFailed(rc));
            }

            for (addr, handle) in [
                (pins::EXPANDER_IN_ADDR, &raw mut IN_DEV),
                (pins::EXPANDER_OUT_ADDR, &raw mut OUT_DEV),
            ] {
                let dev_cfg = i2c_device_config_t {
                    device_address: addr as u16,
                    scl_speed_hz: pins::I2C_FREQ_HZ,
                    ..Default::default()
                };
                let rc = i2c_master_bus_add_device(BUS, &dev_cfg, handle);
                if rc != ESP_OK as i32 {
                    return Err(HwInitError::I2cDeviceFailed(rc));
                }
            }
        }
        info!(
            "expander: bus up (in=0x{:02X}, out=0x{:02X})",
            pins::EXPANDER_IN_ADDR,
            pins::EXPANDER_OUT_ADDR
        );
        Ok(())
    }

    pub fn read_inputs() -> Result<u8, I2cError> {
        let mut byte = 0u8;
        // SAFETY: IN_DEV written once during init(); single-task access.
        let rc = unsafe { i2c_master_receive(in_dev(), &mut byte, 1, XFER_TIMEOUT_MS) };
        if rc == ESP_OK as i32 {
            Ok(byte)
        } else {
            Err(I2cError::ReadFailed)
        }
    }

    pub fn write_outputs(byte: u8) -> Result<(), I2cError> {
        // SAFETY: OUT_DEV written once during init(); single-task access.
        let rc = unsafe { i2c_master_transmit(out_dev(), &byte, 1, XFER_TIMEOUT_MS) };
        if rc == ESP_OK as i32 {
            Ok(())
        } else {
            Err(I2cError::WriteFailed)
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod imp {
    use super::*;
    use crate::pins::ALL_RELEASED;

    /// Simulation: no buttons are ever pressed, LED writes vanish.
    pub fn read_inputs() -> Result<u8, I2cError> {
        Ok(ALL_RELEASED)
    }

    pub fn write_outputs(_byte: u8) -> Result<(), I2cError> {
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
pub use imp::init;
pub use imp::{read_inputs, write_outputs};
