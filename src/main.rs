//! envnode firmware: main entry point.
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    SerialSink + LogEventSink   EepromAdapter  │
//! │  (Sensor+Output)    (EventSink)                 (ByteStore)    │
//! │  SystemClock        line reader (stdin → channel)              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  acquisition · automation · safety · alert · telemetry │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On the host the same binary runs against simulated sensors: commands
//! come from stdin, JSON lines go to stdout, logs go to stderr.
//!
//! ```text
//! envnode [CONFIG] [--eeprom settings.bin]     RUST_LOG=debug
//! ```
#![deny(unused_must_use)]

use std::io::{self, BufReader};
use std::path::Path;
#[cfg(not(target_os = "espidf"))]
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
#[cfg(not(target_os = "espidf"))]
use clap::Parser;
use log::{error, info};

use envnode::adapters::channels::{self, COMMAND_LINES};

use envnode::adapters::eeprom::EepromAdapter;
use envnode::adapters::hardware::HardwareAdapter;
use envnode::adapters::log_sink::LogEventSink;
use envnode::adapters::serial::{SerialSink, spawn_line_reader};
use envnode::adapters::time::SystemClock;
use envnode::app::ports::Clock;
use envnode::app::service::Controller;
use envnode::config::SystemConfig;
use envnode::drivers::hw_init;
use envnode::drivers::status_led::StatusLed;
use envnode::error::Error;
use envnode::sensors::SensorHub;

// ── Command line (host only) ──────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Parser, Debug)]
#[command(name = "envnode", version, about = "Environmental controller, host simulation")]
struct Args {
    /// JSON file overriding the factory configuration
    config: Option<PathBuf>,

    /// File backing the settings store; in-memory when omitted
    #[arg(long, env = "ENVNODE_EEPROM")]
    eeprom: Option<PathBuf>,
}

// ── Bootstrap helpers ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Ok(())
}

/// Factory config, or the JSON file at `path`.
fn load_config(path: Option<&Path>) -> Result<SystemConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            let config: SystemConfig = serde_json::from_str(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?;
            info!("config loaded from {}", path.display());
            config
        }
        None => SystemConfig::default(),
    };
    config.validate().map_err(Error::from)?;
    Ok(config)
}

#[cfg(target_os = "espidf")]
fn open_store(_backing: Option<&Path>) -> Result<EepromAdapter> {
    Ok(EepromAdapter::new().map_err(Error::from)?)
}

#[cfg(not(target_os = "espidf"))]
fn open_store(backing: Option<&Path>) -> Result<EepromAdapter> {
    let store = match backing {
        Some(path) => EepromAdapter::with_backing_file(path),
        None => EepromAdapter::new(),
    };
    Ok(store.map_err(Error::from)?)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    #[cfg(not(target_os = "espidf"))]
    let args = Args::parse();
    #[cfg(not(target_os = "espidf"))]
    let (config_path, eeprom_path) = (args.config.as_deref(), args.eeprom.as_deref());
    #[cfg(target_os = "espidf")]
    let (config_path, eeprom_path): (Option<&Path>, Option<&Path>) = (None, None);

    // ── 1. Logging ────────────────────────────────────────────
    init_logging()?;
    info!("envnode v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {e}");
        return Err(e.into());
    }

    // ── 3. Config and settings store ──────────────────────────
    let config = load_config(config_path)?;
    let pause = Duration::from_millis(u64::from(config.loop_pause_ms));
    let mut store = match open_store(eeprom_path) {
        Ok(store) => store,
        Err(e) => {
            error!("settings store unavailable: {e:#}");
            return Err(e);
        }
    };

    // ── 4. Adapters ───────────────────────────────────────────
    let mut hw = HardwareAdapter::new(SensorHub::new(), StatusLed::new());
    let mut sink = (SerialSink::new(io::stdout()), LogEventSink::new());
    let clock = SystemClock::new();
    let _reader = spawn_line_reader(BufReader::new(io::stdin()), &COMMAND_LINES);

    // ── 5. Boot sequence ──────────────────────────────────────
    let mut controller = Controller::new(config);
    controller.start(&mut hw, &mut store, &mut sink);
    info!("system ready, entering control loop");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        let line = channels::try_recv_line();
        controller.run_once(clock.now_ms(), &mut hw, &mut store, &mut sink, line.as_deref());
        thread::sleep(pause);
    }
}
