//! Telemetry reporter.
//!
//! Flattens the controller state into one JSON object for the dashboard
//! relay.  Field names are camelCase and booleans go out as `0`/`1`, which
//! is what the relay and the dashboard expect.

use serde::{Serialize, Serializer};

use crate::actuators::Output;
use crate::app::context::ControllerContext;

/// One telemetry line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    pub temperature: f32,
    pub humidity: f32,
    pub ldr: u16,
    pub gas: u16,
    #[serde(serialize_with = "flag")]
    pub motion: bool,
    #[serde(serialize_with = "flag")]
    pub living_room: bool,
    #[serde(serialize_with = "flag")]
    pub bedroom: bool,
    #[serde(serialize_with = "flag")]
    pub kitchen: bool,
    #[serde(serialize_with = "flag")]
    pub bathroom: bool,
    #[serde(serialize_with = "flag")]
    pub led_a2: bool,
    #[serde(serialize_with = "flag")]
    pub led_a3: bool,
    #[serde(serialize_with = "flag")]
    pub led_a4: bool,
    #[serde(serialize_with = "flag")]
    pub led_a5: bool,
    #[serde(serialize_with = "flag")]
    pub fan: bool,
    #[serde(serialize_with = "flag")]
    pub ac: bool,
    #[serde(serialize_with = "flag")]
    pub alarm: bool,
    #[serde(serialize_with = "flag")]
    pub auto_light: bool,
    #[serde(serialize_with = "flag")]
    pub auto_temp: bool,
    #[serde(serialize_with = "flag")]
    pub temp_alert: bool,
    #[serde(serialize_with = "flag")]
    pub system_error: bool,
    pub dht_errors: u32,
    pub gas_baseline: u16,
    /// Seconds since boot.
    pub uptime: u64,
    #[serde(serialize_with = "flag")]
    pub temp_alert_enabled: bool,
    #[serde(serialize_with = "flag")]
    pub system_enabled: bool,
    pub gas_errors: u32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn flag<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(u8::from(*value))
}

/// Round to one decimal; non-finite readings become 0.
pub fn round1(value: f32) -> f32 {
    if value.is_finite() {
        (value * 10.0).round() / 10.0
    } else {
        0.0
    }
}

/// Capture the current state.  LED fields carry the logical values, not
/// the blink phase.
pub fn snapshot(ctx: &ControllerContext, now_ms: u64) -> TelemetryRecord {
    let on = |output| ctx.actuators.is_on(output);
    TelemetryRecord {
        temperature: round1(ctx.sensors.temperature_c),
        humidity: round1(ctx.sensors.humidity_pct),
        ldr: ctx.sensors.light,
        gas: ctx.sensors.gas,
        motion: ctx.sensors.motion,
        living_room: on(Output::LivingRoom),
        bedroom: on(Output::Bedroom),
        kitchen: on(Output::Kitchen),
        bathroom: on(Output::Bathroom),
        led_a2: on(Output::LedA2),
        led_a3: on(Output::LedA3),
        led_a4: on(Output::LedA4),
        led_a5: on(Output::LedA5),
        fan: on(Output::Fan),
        ac: on(Output::Ac),
        alarm: ctx.alarm_active(),
        auto_light: ctx.modes.auto_light,
        auto_temp: ctx.modes.auto_temp,
        temp_alert: ctx.alert.active,
        system_error: ctx.errors.system_error,
        dht_errors: ctx.errors.climate,
        gas_baseline: ctx.gas_baseline,
        uptime: now_ms / 1000,
        temp_alert_enabled: ctx.alert.enabled,
        system_enabled: ctx.modes.system_enabled,
        gas_errors: ctx.errors.gas,
    }
}

/// Snapshot, then release `system_error` if every counter is back to
/// zero.  The returned record still shows the error, so it is visible
/// for at least one report.  The flag is `true` if the error was released.
pub fn report(ctx: &mut ControllerContext, now_ms: u64) -> (TelemetryRecord, bool) {
    let record = snapshot(ctx, now_ms);
    let released = ctx.errors.system_error && ctx.errors.all_clear();
    if released {
        ctx.errors.system_error = false;
    }
    (record, released)
}
