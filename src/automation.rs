//! Automation engine: motion lighting and climate control.
//!
//! Both rules run every loop iteration against the latest sensor
//! snapshot, and only while the system is enabled.  Each one is gated by
//! its own user mode (`AUTO_LIGHT_TOGGLE`, `AUTO_TEMP_TOGGLE`).
//!
//! Lighting:
//!
//! ```text
//!   motion && light < dark      ──▶ living room ON, refresh last_motion
//!   ON && now - last_motion > T ──▶ living room OFF
//! ```
//!
//! Climate uses two hysteresis bands that share their lower edge:
//!
//! ```text
//!   fan: ON above fan_on, OFF below fan_off
//!   AC : ON above ac_on,  OFF below fan_off
//! ```

use log::info;

use crate::actuators::Output;
use crate::app::context::ControllerContext;
use crate::app::ports::OutputPort;

/// Run every enabled automation rule.
pub fn step(ctx: &mut ControllerContext, now_ms: u64, hw: &mut impl OutputPort) {
    if !ctx.modes.system_enabled {
        return;
    }
    if ctx.modes.auto_light {
        lighting(ctx, now_ms, hw);
    }
    if ctx.modes.auto_temp {
        climate(ctx, hw);
    }
}

/// Motion-activated living-room light with an inactivity timeout.
pub fn lighting(ctx: &mut ControllerContext, now_ms: u64, hw: &mut impl OutputPort) {
    let dark = ctx.sensors.light < ctx.config.dark_threshold;
    if ctx.sensors.motion && dark {
        ctx.last_motion_ms = now_ms;
        if ctx.actuators.set(Output::LivingRoom, true, hw).changed() {
            info!("motion in the dark (light={}), living room on", ctx.sensors.light);
        }
    }

    let idle_ms = now_ms.saturating_sub(ctx.last_motion_ms);
    if ctx.actuators.is_on(Output::LivingRoom) && idle_ms > u64::from(ctx.config.motion_timeout_ms) {
        ctx.actuators.set(Output::LivingRoom, false, hw);
        info!("no motion for {idle_ms} ms, living room off");
    }
}

/// Fan and AC thresholds.  Does nothing until a valid temperature exists.
pub fn climate(ctx: &mut ControllerContext, hw: &mut impl OutputPort) {
    let Some(t) = ctx.sensors.temperature() else {
        return;
    };
    let th = ctx.thresholds;

    if t > th.fan_on_c {
        if ctx.actuators.set(Output::Fan, true, hw).changed() {
            info!("{t:.1} °C > {:.1}, fan on", th.fan_on_c);
        }
    } else if t < th.fan_off_c && ctx.actuators.set(Output::Fan, false, hw).changed() {
        info!("{t:.1} °C < {:.1}, fan off", th.fan_off_c);
    }

    if t > th.ac_on_c {
        if ctx.actuators.set(Output::Ac, true, hw).changed() {
            info!("{t:.1} °C > {:.1}, AC on", th.ac_on_c);
        }
    } else if t < th.fan_off_c && ctx.actuators.set(Output::Ac, false, hw).changed() {
        info!("{t:.1} °C < {:.1}, AC off", th.fan_off_c);
    }
}
