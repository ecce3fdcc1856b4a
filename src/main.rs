//! Whac-A-Mole Firmware — Main Entry Point
//!
//! Five concurrent components under the FreeRTOS priority scheduler:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  RX pump (prio 18)     drains UART FIFO → command dispatcher   │
//! │      │ pause signal            │ command queue (8)             │
//! │      ▼                         ▼                               │
//! │  Pause ctrl (17) ──suspend──▶ Game task (16)                   │
//! │                                │ event queue (32)              │
//! │                                ▼                               │
//! │                           Telemetry task (15)                  │
//! │                                │ JSON lines / offline ring     │
//! │                                ▼                               │
//! │                             UART TX                            │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bootstrap order matters: peripherals first (fatal on failure), then
//! the consumers (telemetry, game, pause), and only then the RX pump —
//! no command can arrive before everything that handles commands exists.
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::{error, info};

use whacamole::adapters::device_id;
use whacamole::adapters::hardware::BoardAdapter;
use whacamole::adapters::serial::{self, UartTransport};
use whacamole::adapters::time::MonotonicClock;
use whacamole::channels::{QueueCommandSource, QueueEventSink, QueueEventSource};
use whacamole::config::{
    PRIO_GAME, PRIO_PAUSE, PRIO_TELEMETRY, STACK_KB_GAME, STACK_KB_PAUSE, STACK_KB_TELEMETRY,
};
use whacamole::dispatch;
use whacamole::drivers::task_pin::{spawn_on_core, Core};
use whacamole::game::GameTask;
use whacamole::telemetry::TelemetryTask;
use whacamole::{drivers, pause};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("whacamole v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Peripherals (fatal on failure) ─────────────────────
    drivers::hw_init::init_peripherals().context("peripheral init failed")?;
    serial::init_uart().context("UART init failed")?;

    // ── 3. Device identity ────────────────────────────────────
    let dev_id = device_id::device_id();
    info!("device id: {}", dev_id);

    // ── 4. Telemetry task ─────────────────────────────────────
    let _telemetry = spawn_on_core(
        Core::Pro,
        PRIO_TELEMETRY,
        STACK_KB_TELEMETRY,
        "telemetry\0",
        move || {
            let mut task = TelemetryTask::new(
                UartTransport::new(),
                QueueEventSource,
                &dispatch::CONN,
                dev_id,
            );
            let mut clock = MonotonicClock::new();
            task.run(&mut clock);
        },
    );

    // ── 5. Game task (publishes its handle for the pause ctrl) ─
    let _game = spawn_on_core(Core::App, PRIO_GAME, STACK_KB_GAME, "game\0", || {
        pause::publish_game_task();
        let mut game = GameTask::new(
            BoardAdapter::new(),
            MonotonicClock::new(),
            QueueCommandSource,
            QueueEventSink,
        );
        if let Err(e) = game.run() {
            // Expander gone while idle; nothing sensible left to drive.
            error!("game task stopped: {}", e);
        }
    });

    // ── 6. Pause controller ───────────────────────────────────
    let _pause = spawn_on_core(Core::App, PRIO_PAUSE, STACK_KB_PAUSE, "pause\0", || {
        pause::controller_loop();
    });

    // ── 7. Command ingress last ───────────────────────────────
    let _rx = serial::spawn_rx_pump();

    info!("system ready");
    loop {
        std::thread::sleep(std::time::Duration::from_secs(60));
    }
}
