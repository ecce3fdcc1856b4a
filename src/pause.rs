//! Pause controller — toggles the game task between suspended and runnable.
//!
//! The dispatcher signals [`crate::channels::PAUSE_SIGNAL`] on every `P`
//! byte; this task wakes (it outranks the game task, so immediately),
//! flips its internal state, and suspends or resumes the game task.
//! Suspension is idempotent and does not touch the command queue: while
//! the game task is frozen no new events are produced, but events already
//! queued keep draining through telemetry.
//!
//! On ESP-IDF the suspension is `vTaskSuspend` on the game task's
//! FreeRTOS handle, published by the game thread at startup. In
//! simulation a condvar gate stands in: the clock adapter parks on it
//! between delay slices, which is exactly where a real suspend would
//! land.

use log::info;

use crate::channels;

/// Toggle tracker for the controller loop. Split out so the state machine
/// is testable without a kernel.
#[derive(Debug, Default)]
pub struct PauseState {
    paused: bool,
}

impl PauseState {
    pub fn new() -> Self {
        Self { paused: false }
    }

    /// Process one notification; returns the new paused state.
    pub fn toggle(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Controller entry point, spawned above the game task's priority.
pub fn controller_loop() -> ! {
    let mut state = PauseState::new();
    loop {
        channels::wait_pause();
        if state.toggle() {
            info!("pause: suspending game task");
            suspend_game();
        } else {
            info!("pause: resuming game task");
            resume_game();
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Game task handle (ESP-IDF)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod imp {
    use core::ffi::c_void;
    use core::ptr;
    use core::sync::atomic::{AtomicPtr, Ordering};

    static GAME_TASK: AtomicPtr<c_void> = AtomicPtr::new(ptr::null_mut());

    /// Called by the game thread before it enters its loop.
    pub fn publish_game_task() {
        // SAFETY: xTaskGetCurrentTaskHandle has no preconditions; the
        // returned handle stays valid for the task's lifetime (tasks are
        // never deleted here).
        let handle = unsafe { esp_idf_svc::sys::xTaskGetCurrentTaskHandle() };
        GAME_TASK.store(handle.cast(), Ordering::Release);
    }

    pub fn suspend_game() {
        let handle = GAME_TASK.load(Ordering::Acquire);
        if !handle.is_null() {
            // SAFETY: handle was published by the live game task.
            unsafe { esp_idf_svc::sys::vTaskSuspend(handle.cast()) };
        }
    }

    pub fn resume_game() {
        let handle = GAME_TASK.load(Ordering::Acquire);
        if !handle.is_null() {
            // SAFETY: as above. Resuming a task that is not suspended is
            // a no-op in FreeRTOS.
            unsafe { esp_idf_svc::sys::vTaskResume(handle.cast()) };
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Game task gate (simulation)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod imp {
    use std::sync::{Condvar, Mutex, OnceLock};

    /// Condvar gate standing in for `vTaskSuspend` on the host.
    pub struct PauseGate {
        paused: Mutex<bool>,
        unpause: Condvar,
    }

    impl PauseGate {
        const fn new() -> Self {
            Self {
                paused: Mutex::new(false),
                unpause: Condvar::new(),
            }
        }

        fn set_paused(&self, paused: bool) {
            let mut guard = self.paused.lock().unwrap_or_else(|e| e.into_inner());
            *guard = paused;
            if !paused {
                self.unpause.notify_all();
            }
        }

        fn block_while_paused(&self) {
            let mut guard = self.paused.lock().unwrap_or_else(|e| e.into_inner());
            while *guard {
                guard = self
                    .unpause
                    .wait(guard)
                    .unwrap_or_else(|e| e.into_inner());
            }
        }
    }

    static GATE: OnceLock<PauseGate> = OnceLock::new();

    fn gate() -> &'static PauseGate {
        GATE.get_or_init(PauseGate::new)
    }

    pub fn publish_game_task() {
        // The gate is global; nothing to publish on the host.
        let _ = gate();
    }

    pub fn suspend_game() {
        gate().set_paused(true);
    }

    pub fn resume_game() {
        gate().set_paused(false);
    }

    /// Suspension point for the simulated clock: parks the caller while
    /// the gate is closed, so paused intervals never count toward
    /// reaction timing.
    pub fn block_while_paused() {
        gate().block_while_paused();
    }
}

pub use imp::{publish_game_task, resume_game, suspend_game};

#[cfg(not(target_os = "espidf"))]
pub use imp::block_while_paused;
