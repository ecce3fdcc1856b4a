//! Device identity derived from the factory-programmed unique serial.
//!
//! Produces a stable 10-character lowercase hex id from the last 5 bytes
//! of the MCU's eFuse serial number (the base MAC on ESP32-S3). The id is:
//! - Deterministic across reboots (factory-burned eFuse)
//! - Carried in every `identify` frame so the host relay can attribute
//!   event streams to a physical board
//! - Memoised after the first derivation

use std::sync::OnceLock;

/// Fixed-size id string: 10 hex chars.
pub type DeviceIdString = heapless::String<16>;

/// Full 6-byte factory serial.
pub type SerialNumber = [u8; 6];

/// Read the factory serial from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_serial() -> SerialNumber {
    let mut serial: SerialNumber = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(serial.as_mut_ptr());
    }
    serial
}

/// Simulation: returns a deterministic fake serial.
#[cfg(not(target_os = "espidf"))]
pub fn read_serial() -> SerialNumber {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Derive the id from the last 5 serial bytes, lowercase hex.
pub fn derive(serial: &SerialNumber) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    use core::fmt::Write;
    let _ = write!(
        id,
        "{:02x}{:02x}{:02x}{:02x}{:02x}",
        serial[1], serial[2], serial[3], serial[4], serial[5]
    );
    id
}

/// The board's id, derived once and cached for the process lifetime.
pub fn device_id() -> &'static str {
    static ID: OnceLock<DeviceIdString> = OnceLock::new();
    ID.get_or_init(|| derive(&read_serial())).as_str()
}
