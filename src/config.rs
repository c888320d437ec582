//! System configuration parameters
//!
//! All tunable parameters for the envnode controller. The factory values
//! below are what the board ships with; the host binary can override them
//! from a JSON file.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Climate ---
    /// Fan switches on above this temperature (°C)
    pub fan_on_temp_c: f32,
    /// Fan (and AC) switch off below this temperature (°C)
    pub fan_off_temp_c: f32,
    /// AC switches on above this temperature (°C)
    pub ac_on_temp_c: f32,

    // --- Temperature alert ---
    /// Alert when temperature drops below this bound (°C)
    pub temp_low_alert_c: f32,
    /// Alert when temperature rises above this bound (°C)
    pub temp_high_alert_c: f32,

    // --- Gas ---
    /// Baseline used until the first calibration (raw ADC counts)
    pub default_gas_baseline: u16,
    /// Alarm trips at baseline + this offset
    pub gas_alarm_offset: u16,
    /// Alarm clears below baseline + this offset
    pub gas_safe_offset: u16,
    /// Highest raw value the gas sensor can legitimately produce
    pub gas_max_raw: u16,
    /// Samples averaged by a calibration run
    pub calibration_samples: u8,
    /// Spacing between calibration samples (milliseconds)
    pub calibration_spacing_ms: u32,

    // --- Lighting ---
    /// Light readings below this are "dark" (raw ADC counts)
    pub dark_threshold: u16,
    /// Living-room light turns off after this long without motion (milliseconds)
    pub motion_timeout_ms: u32,

    // --- Faults ---
    /// Consecutive bad reads tolerated before `system_error` is raised
    pub error_limit: u32,

    // --- Timing ---
    /// Sensor read interval (milliseconds)
    pub sensor_interval_ms: u32,
    /// Temperature-alert blink interval (milliseconds)
    pub alert_blink_interval_ms: u32,
    /// Telemetry report interval (milliseconds)
    pub telemetry_interval_ms: u32,
    /// Status LED half-period while a sensor fault is active (milliseconds)
    pub status_fault_blink_ms: u32,
    /// Status LED half-period while the gas alarm is raised (milliseconds)
    pub status_alarm_blink_ms: u32,
    /// Pause between loop iterations (milliseconds)
    pub loop_pause_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Climate
            fan_on_temp_c: 28.0,
            fan_off_temp_c: 26.0,
            ac_on_temp_c: 30.0,

            // Temperature alert
            temp_low_alert_c: 15.0,
            temp_high_alert_c: 35.0,

            // Gas
            default_gas_baseline: 200,
            gas_alarm_offset: 200,
            gas_safe_offset: 100,
            gas_max_raw: 1023,
            calibration_samples: 10,
            calibration_spacing_ms: 100,

            // Lighting
            dark_threshold: 300,
            motion_timeout_ms: 30_000,

            // Faults
            error_limit: 5,

            // Timing
            sensor_interval_ms: 1000,
            alert_blink_interval_ms: 500,
            telemetry_interval_ms: 2000,
            status_fault_blink_ms: 250,
            status_alarm_blink_ms: 1000,
            loop_pause_ms: 10,
        }
    }
}

impl SystemConfig {
    /// Range-check every field that the rules depend on.
    ///
    /// Inverted hysteresis bands are rejected rather than clamped; they
    /// would make the fan or the gas alarm oscillate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fan_on_temp_c.is_finite()
            || !self.fan_off_temp_c.is_finite()
            || !self.ac_on_temp_c.is_finite()
        {
            return Err(ConfigError::ValidationFailed(
                "climate thresholds must be finite",
            ));
        }
        if self.fan_off_temp_c >= self.fan_on_temp_c {
            return Err(ConfigError::ValidationFailed(
                "fan_off_temp_c must be < fan_on_temp_c",
            ));
        }
        if self.ac_on_temp_c < self.fan_on_temp_c {
            return Err(ConfigError::ValidationFailed(
                "ac_on_temp_c must be >= fan_on_temp_c",
            ));
        }
        if !self.temp_low_alert_c.is_finite()
            || !self.temp_high_alert_c.is_finite()
            || self.temp_low_alert_c >= self.temp_high_alert_c
        {
            return Err(ConfigError::ValidationFailed(
                "temp_low_alert_c must be < temp_high_alert_c",
            ));
        }
        if self.gas_safe_offset >= self.gas_alarm_offset {
            return Err(ConfigError::ValidationFailed(
                "gas_safe_offset must be < gas_alarm_offset",
            ));
        }
        if self.default_gas_baseline > self.gas_max_raw {
            return Err(ConfigError::ValidationFailed(
                "default_gas_baseline must be <= gas_max_raw",
            ));
        }
        if self.calibration_samples == 0 {
            return Err(ConfigError::ValidationFailed(
                "calibration_samples must be > 0",
            ));
        }
        if self.sensor_interval_ms == 0
            || self.alert_blink_interval_ms == 0
            || self.telemetry_interval_ms == 0
            || self.status_fault_blink_ms == 0
            || self.status_alarm_blink_ms == 0
        {
            return Err(ConfigError::ValidationFailed("intervals must be > 0"));
        }
        Ok(())
    }
}
