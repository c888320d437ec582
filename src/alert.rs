//! Temperature alert controller.
//!
//! Two states, switched on edges only:
//!
//! ```text
//!            t < low || t > high
//!   Normal ────────────────────────▶ Alerting
//!          ◀────────────────────────
//!            low <= t <= high
//! ```
//!
//! While alerting, A2 and A3 blink together.  The blink owns the two pins
//! through the actuator bank's display override; their logical values are
//! left alone and written back when the alert ends.

use log::{info, warn};

use crate::app::context::ControllerContext;
use crate::app::ports::OutputPort;

/// Alert predicate.  `None` for a NaN temperature, which must neither
/// raise nor clear the alert.
pub fn should_alert(temperature_c: f32, low_c: f32, high_c: f32) -> Option<bool> {
    if temperature_c.is_nan() {
        None
    } else {
        Some(temperature_c < low_c || temperature_c > high_c)
    }
}

/// Re-evaluate the alert against the last valid temperature.
///
/// Returns the new state if it flipped.
pub fn evaluate(
    ctx: &mut ControllerContext,
    now_ms: u64,
    hw: &mut impl OutputPort,
) -> Option<bool> {
    if !ctx.alert.enabled {
        return None;
    }
    let want = should_alert(
        ctx.sensors.temperature_c,
        ctx.thresholds.temp_low_c,
        ctx.thresholds.temp_high_c,
    )?;
    if want == ctx.alert.active {
        return None;
    }

    if want {
        warn!(
            "temperature alert: {:.1} °C outside [{:.1}, {:.1}]",
            ctx.sensors.temperature_c, ctx.thresholds.temp_low_c, ctx.thresholds.temp_high_c
        );
        ctx.alert.active = true;
        ctx.alert.blink_phase = true;
        ctx.alert.last_blink_ms = now_ms;
        ctx.actuators.override_alert_leds(true, hw);
    } else {
        info!("temperature back in range ({:.1} °C)", ctx.sensors.temperature_c);
        leave(ctx, hw);
    }
    Some(want)
}

/// Advance the blink while alerting.  Returns `true` if the pins moved.
pub fn blink(ctx: &mut ControllerContext, now_ms: u64, hw: &mut impl OutputPort) -> bool {
    if !ctx.alert.active {
        return false;
    }
    let interval = u64::from(ctx.config.alert_blink_interval_ms);
    if now_ms.saturating_sub(ctx.alert.last_blink_ms) < interval {
        return false;
    }
    ctx.alert.blink_phase = !ctx.alert.blink_phase;
    ctx.alert.last_blink_ms = now_ms;
    ctx.actuators.override_alert_leds(ctx.alert.blink_phase, hw);
    true
}

/// Drop straight to Normal.  Returns `true` if an alert was active.
pub fn force_normal(ctx: &mut ControllerContext, hw: &mut impl OutputPort) -> bool {
    if !ctx.alert.active {
        return false;
    }
    info!("temperature alert cancelled");
    leave(ctx, hw);
    true
}

fn leave(ctx: &mut ControllerContext, hw: &mut impl OutputPort) {
    ctx.alert.active = false;
    ctx.alert.blink_phase = false;
    ctx.actuators.release_alert_leds(hw);
}
