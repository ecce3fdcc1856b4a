//! Monotonic clock adapter.
//!
//! Implements the [`Clock`] port for the tasks.
//!
//! - **`target_os = "espidf"`** — `now_ms` wraps `esp_timer_get_time()`
//!   (microsecond monotonic); `delay_ms` sleeps the calling pthread,
//!   which is a FreeRTOS `vTaskDelay` underneath — the scheduler's
//!   suspension point.
//! - **`not(target_os = "espidf")`** — `std::time::Instant` plus a real
//!   sleep, with the pause gate honoured between slices so a simulated
//!   suspend behaves like the FreeRTOS one.

use crate::app::ports::Clock;

pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[cfg(target_os = "espidf")]
    fn now_ms(&self) -> u32 {
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1000) as u32
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        crate::pause::block_while_paused();
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_monotonic() {
        let mut clock = MonotonicClock::new();
        let before = clock.now_ms();
        clock.delay_ms(5);
        assert!(clock.now_ms() >= before + 5);
    }
}
