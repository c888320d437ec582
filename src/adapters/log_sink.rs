//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the logger
//! (ESP-IDF log on the device, `env_logger` on the host).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | T={:.1}\u{00b0}C H={:.1}% | ldr={} gas={} motion={} | \
                     fan={} ac={} alarm={} alert={} | errors dht={} gas={} sys={} | up={}s",
                    t.temperature,
                    t.humidity,
                    t.ldr,
                    t.gas,
                    u8::from(t.motion),
                    u8::from(t.fan),
                    u8::from(t.ac),
                    u8::from(t.alarm),
                    u8::from(t.temp_alert),
                    t.dht_errors,
                    t.gas_errors,
                    u8::from(t.system_error),
                    t.uptime,
                );
            }
            AppEvent::Started { gas_baseline } => {
                info!("START | gas_baseline={gas_baseline}");
            }
            AppEvent::CommandAccepted(cmd) => {
                info!("CMD   | {cmd}");
            }
            AppEvent::CommandRejected(text) => {
                warn!("CMD   | unknown '{text}'");
            }
            AppEvent::AlarmChanged(true) => error!("ALARM | gas leak"),
            AppEvent::AlarmChanged(false) => info!("ALARM | cleared"),
            AppEvent::AlertChanged(active) => {
                info!("ALERT | temperature alert {}", if *active { "on" } else { "off" });
            }
            AppEvent::SystemErrorChanged(true) => error!("FAULT | system error raised"),
            AppEvent::SystemErrorChanged(false) => info!("FAULT | system error cleared"),
            AppEvent::Calibrated {
                baseline,
                alarm,
                safe,
            } => {
                info!("CAL   | baseline={baseline} alarm={alarm} safe={safe}");
            }
            AppEvent::CalibrationFailed => warn!("CAL   | failed, baseline unchanged"),
            AppEvent::StorageFailed(e) => warn!("STORE | {e}"),
        }
    }
}
