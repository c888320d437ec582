//! Shared mutable context threaded through every component step.
//!
//! `ControllerContext` is the single struct that the rule components
//! read from and write to: the latest sensor snapshot, actuator state,
//! thresholds, alert and error bookkeeping, and the user-facing modes.
//! It is exclusively owned by the [`Controller`](super::service::Controller)
//! and handed to each step as `&mut`.

use crate::actuators::{ActuatorBank, Output};
use crate::config::SystemConfig;
use crate::indicator::StatusIndicator;
use crate::persistence::PersistentSettings;

// ---------------------------------------------------------------------------
// Sensor snapshot (written by acquisition, read by every rule)
// ---------------------------------------------------------------------------

/// Latest accepted reading of every sensor.
#[derive(Debug, Clone, Copy)]
pub struct SensorSnapshot {
    /// Temperature (°C).  `NaN` until the first valid read.
    pub temperature_c: f32,
    /// Relative humidity (%).  `NaN` until the first valid read.
    pub humidity_pct: f32,
    /// Ambient light, raw 0–1023.
    pub light: u16,
    /// Gas concentration, raw 0–1023.
    pub gas: u16,
    /// PIR output at the last read.
    pub motion: bool,
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            temperature_c: f32::NAN,
            humidity_pct: f32::NAN,
            light: 0,
            gas: 0,
            motion: false,
        }
    }
}

impl SensorSnapshot {
    /// Temperature, if one has ever been read successfully.
    pub fn temperature(&self) -> Option<f32> {
        (!self.temperature_c.is_nan()).then_some(self.temperature_c)
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub fan_on_c: f32,
    pub fan_off_c: f32,
    pub ac_on_c: f32,
    pub temp_low_c: f32,
    pub temp_high_c: f32,
    pub gas_alarm: u16,
    pub gas_safe: u16,
}

impl Thresholds {
    pub fn new(config: &SystemConfig, gas_baseline: u16) -> Self {
        Self {
            fan_on_c: config.fan_on_temp_c,
            fan_off_c: config.fan_off_temp_c,
            ac_on_c: config.ac_on_temp_c,
            temp_low_c: config.temp_low_alert_c,
            temp_high_c: config.temp_high_alert_c,
            gas_alarm: gas_baseline.saturating_add(config.gas_alarm_offset),
            gas_safe: gas_baseline.saturating_add(config.gas_safe_offset),
        }
    }

    /// Re-derive the gas band from a new baseline.
    pub fn apply_gas_baseline(&mut self, config: &SystemConfig, baseline: u16) {
        self.gas_alarm = baseline.saturating_add(config.gas_alarm_offset);
        self.gas_safe = baseline.saturating_add(config.gas_safe_offset);
    }
}

// ---------------------------------------------------------------------------
// Temperature alert bookkeeping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertState {
    /// Alert feature switched on (`TEMP_ALERT_ON`).
    pub enabled: bool,
    /// Currently alerting.
    pub active: bool,
    /// Level the blink loop last drove onto A2/A3.
    pub blink_phase: bool,
    pub last_blink_ms: u64,
}

impl Default for AlertState {
    fn default() -> Self {
        Self {
            enabled: true,
            active: false,
            blink_phase: false,
            last_blink_ms: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Error counters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorCounters {
    /// Consecutive failed temperature/humidity reads.
    pub climate: u32,
    /// Consecutive out-of-range gas reads.
    pub gas: u32,
    /// Sustained fault latched; cleared by telemetry or `RESET_ERRORS`.
    pub system_error: bool,
}

impl ErrorCounters {
    pub fn all_clear(&self) -> bool {
        self.climate == 0 && self.gas == 0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// User modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modes {
    pub auto_light: bool,
    pub auto_temp: bool,
    /// `SYSTEM_DISABLE` suspends every automatic rule.
    pub system_enabled: bool,
}

// ---------------------------------------------------------------------------
// ControllerContext
// ---------------------------------------------------------------------------

/// The process-wide state record.
pub struct ControllerContext {
    pub config: SystemConfig,
    pub sensors: SensorSnapshot,
    pub actuators: ActuatorBank,
    pub thresholds: Thresholds,
    pub alert: AlertState,
    pub errors: ErrorCounters,
    pub modes: Modes,
    pub indicator: StatusIndicator,
    /// Calibrated gas baseline (raw counts).
    pub gas_baseline: u16,
    /// Last time motion was seen in the dark.
    pub last_motion_ms: u64,
}

impl ControllerContext {
    /// Create a new context with factory settings.
    pub fn new(config: SystemConfig) -> Self {
        let defaults = PersistentSettings::factory(&config);
        let thresholds = Thresholds::new(&config, defaults.gas_baseline);
        let mut ctx = Self {
            config,
            sensors: SensorSnapshot::default(),
            actuators: ActuatorBank::new(),
            thresholds,
            alert: AlertState::default(),
            errors: ErrorCounters::default(),
            modes: Modes {
                auto_light: defaults.auto_light,
                auto_temp: defaults.auto_temp,
                system_enabled: true,
            },
            indicator: StatusIndicator::new(),
            gas_baseline: defaults.gas_baseline,
            last_motion_ms: 0,
        };
        ctx.apply_settings(&defaults);
        ctx
    }

    /// Gas alarm raised.  The buzzer is the alarm's physical face.
    pub fn alarm_active(&self) -> bool {
        self.actuators.is_on(Output::Buzzer)
    }

    /// Snapshot of the fields that survive power loss.
    pub fn persistent_settings(&self) -> PersistentSettings {
        PersistentSettings {
            auto_light: self.modes.auto_light,
            auto_temp: self.modes.auto_temp,
            gas_baseline: self.gas_baseline,
            aux_leds: Output::AUX_LEDS.map(|led| self.actuators.is_on(led)),
        }
    }

    /// Adopt loaded settings.  LED values are staged logically; the
    /// caller syncs the physical lines afterwards.
    pub fn apply_settings(&mut self, settings: &PersistentSettings) {
        self.modes.auto_light = settings.auto_light;
        self.modes.auto_temp = settings.auto_temp;
        self.gas_baseline = settings.gas_baseline;
        self.thresholds
            .apply_gas_baseline(&self.config, settings.gas_baseline);
        for (led, on) in Output::AUX_LEDS.into_iter().zip(settings.aux_leds) {
            let _ = self.actuators.stage(led, on);
        }
    }
}
