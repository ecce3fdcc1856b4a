//! Serial link adapter — UART transport and the RX pump.
//!
//! The link is 8-N-1: newline-terminated JSON device → host, single-byte
//! commands host → device. Two halves live here:
//!
//! - [`UartTransport`] implements the telemetry [`Transport`] over the
//!   UART TX path.
//! - [`spawn_rx_pump`] starts the highest-priority task in the system: it
//!   blocks in the UART driver, drains the RX FIFO as the driver's ISR
//!   fills it, and hands each byte to [`crate::dispatch::on_rx_byte`]. It
//!   stands in for running the dispatcher directly in the ISR, with the
//!   same contract: drain fully, defer all non-trivial work, let priority
//!   do the preemption.
//!
//! Simulation fallbacks: frames go to stdout, the pump is a no-op.

use log::info;

use crate::telemetry::transport::Transport;

/// Host-side default; the host may reconfigure its end freely.
pub const BAUD_RATE: u32 = 115_200;

#[cfg(target_os = "espidf")]
const RX_BUF_SIZE: usize = 64;

// ───────────────────────────────────────────────────────────────
// TX transport
// ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum SerialError {
    WriteFailed,
    FlushFailed,
}

pub struct UartTransport;

impl UartTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UartTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "espidf")]
impl Transport for UartTransport {
    type Error = SerialError;

    fn write(&mut self, data: &[u8]) -> Result<(), SerialError> {
        use esp_idf_svc::sys::{uart_port_t_UART_NUM_0, uart_write_bytes};
        // SAFETY: the UART driver was installed during bootstrap; the
        // data pointer is valid for `data.len()` bytes.
        let written = unsafe {
            uart_write_bytes(uart_port_t_UART_NUM_0, data.as_ptr().cast(), data.len())
        };
        if written == data.len() as i32 {
            Ok(())
        } else {
            Err(SerialError::WriteFailed)
        }
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        use esp_idf_svc::sys::{uart_port_t_UART_NUM_0, uart_wait_tx_done, ESP_OK};
        // 100 ticks is far beyond one frame at any sane bit rate.
        let rc = unsafe { uart_wait_tx_done(uart_port_t_UART_NUM_0, 100) };
        if rc == ESP_OK as i32 {
            Ok(())
        } else {
            Err(SerialError::FlushFailed)
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl Transport for UartTransport {
    type Error = SerialError;

    fn write(&mut self, data: &[u8]) -> Result<(), SerialError> {
        use std::io::Write;
        std::io::stdout()
            .write_all(data)
            .map_err(|_| SerialError::WriteFailed)
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        use std::io::Write;
        std::io::stdout().flush().map_err(|_| SerialError::FlushFailed)
    }
}

// ───────────────────────────────────────────────────────────────
// Driver install
// ───────────────────────────────────────────────────────────────

/// Install the UART driver (8-N-1). Called once during bootstrap, before
/// the RX pump is spawned.
#[cfg(target_os = "espidf")]
pub fn init_uart() -> Result<(), crate::drivers::hw_init::HwInitError> {
    use crate::drivers::hw_init::HwInitError;
    use crate::pins;
    use esp_idf_svc::sys::*;

    let cfg = uart_config_t {
        baud_rate: BAUD_RATE as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };

    // SAFETY: one-shot init from main() before any task is spawned.
    unsafe {
        let rc = uart_param_config(uart_port_t_UART_NUM_0, &cfg);
        if rc != ESP_OK as i32 {
            return Err(HwInitError::UartInitFailed(rc));
        }
        let rc = uart_set_pin(
            uart_port_t_UART_NUM_0,
            pins::UART_TX_GPIO,
            pins::UART_RX_GPIO,
            UART_PIN_NO_CHANGE,
            UART_PIN_NO_CHANGE,
        );
        if rc != ESP_OK as i32 {
            return Err(HwInitError::UartInitFailed(rc));
        }
        let rc = uart_driver_install(
            uart_port_t_UART_NUM_0,
            256,
            256,
            0,
            core::ptr::null_mut(),
            0,
        );
        if rc != ESP_OK as i32 {
            return Err(HwInitError::UartInitFailed(rc));
        }
    }
    info!("serial: UART up at {} baud (8-N-1)", BAUD_RATE);
    Ok(())
}

/// Simulation: nothing to install.
#[cfg(not(target_os = "espidf"))]
pub fn init_uart() -> Result<(), crate::drivers::hw_init::HwInitError> {
    info!("serial(sim): UART init skipped");
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// RX pump
// ───────────────────────────────────────────────────────────────

/// Spawn the RX pump at the top of the priority ladder.
#[cfg(target_os = "espidf")]
pub fn spawn_rx_pump() -> std::thread::JoinHandle<()> {
    use crate::config::{PRIO_RX_PUMP, STACK_KB_RX_PUMP};
    use crate::drivers::task_pin::{spawn_on_core, Core};

    spawn_on_core(Core::App, PRIO_RX_PUMP, STACK_KB_RX_PUMP, "rx-pump\0", || {
        rx_pump_loop();
    })
}

#[cfg(target_os = "espidf")]
fn rx_pump_loop() -> ! {
    use crate::adapters::time::MonotonicClock;
    use crate::app::ports::Clock;
    use esp_idf_svc::sys::{uart_port_t_UART_NUM_0, uart_read_bytes};

    let clock = MonotonicClock::new();
    let mut buf = [0u8; RX_BUF_SIZE];
    loop {
        // Block in the driver until RX data arrives (20-tick granularity
        // keeps the pump responsive without busy-spinning).
        // SAFETY: driver installed during bootstrap; buf outlives the call.
        let n = unsafe {
            uart_read_bytes(
                uart_port_t_UART_NUM_0,
                buf.as_mut_ptr().cast(),
                buf.len() as u32,
                20,
            )
        };
        if n > 0 {
            let now = clock.now_ms();
            for &byte in &buf[..n as usize] {
                crate::dispatch::on_rx_byte(byte, now);
            }
        }
    }
}

/// Simulation: no host link, no pump.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_rx_pump() {
    info!("serial(sim): RX pump skipped");
}
