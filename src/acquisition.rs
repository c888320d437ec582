//! Sensor acquisition.
//!
//! Reads every sensor exactly once per sensor tick and folds the results
//! into the [`SensorSnapshot`](crate::app::context::SensorSnapshot).  A
//! bad sample never reaches the snapshot: the previous value is kept and
//! the matching error counter is bumped instead.  Once a counter passes
//! the configured limit, `system_error` latches.

use log::{error, warn};

use crate::app::context::ControllerContext;
use crate::app::ports::{ClimateSample, SensorPort};
use crate::error::SensorError;

/// Accept a climate sample only if both fields are numbers.
pub fn validate_climate(sample: ClimateSample) -> Result<ClimateSample, SensorError> {
    if sample.temperature_c.is_nan() || sample.humidity_pct.is_nan() {
        Err(SensorError::ClimateUnavailable)
    } else {
        Ok(sample)
    }
}

/// Accept a raw gas reading only inside `0..=max_raw`.
pub fn validate_gas(raw: i32, max_raw: u16) -> Result<u16, SensorError> {
    match u16::try_from(raw) {
        Ok(value) if value <= max_raw => Ok(value),
        _ => Err(SensorError::OutOfRange(raw)),
    }
}

/// One acquisition pass.  Returns `true` if this pass latched
/// `system_error`.
pub fn step(ctx: &mut ControllerContext, sensors: &mut impl SensorPort) -> bool {
    let climate = sensors.read_climate();
    let light = sensors.read_light();
    let gas = sensors.read_gas();
    let motion = sensors.read_motion();

    match validate_climate(climate) {
        Ok(sample) => {
            ctx.sensors.temperature_c = sample.temperature_c;
            ctx.sensors.humidity_pct = sample.humidity_pct;
            ctx.errors.climate = 0;
        }
        Err(e) => {
            ctx.errors.climate = ctx.errors.climate.saturating_add(1);
            warn!("climate read failed ({e}), {} in a row", ctx.errors.climate);
        }
    }

    match validate_gas(gas, ctx.config.gas_max_raw) {
        Ok(value) => {
            ctx.sensors.gas = value;
            ctx.errors.gas = 0;
        }
        Err(e) => {
            ctx.errors.gas = ctx.errors.gas.saturating_add(1);
            warn!("gas {e}, {} in a row", ctx.errors.gas);
        }
    }

    ctx.sensors.light = light;
    ctx.sensors.motion = motion;

    let limit = ctx.config.error_limit;
    if !ctx.errors.system_error && (ctx.errors.climate > limit || ctx.errors.gas > limit) {
        ctx.errors.system_error = true;
        error!(
            "system error: climate failures={}, gas failures={}",
            ctx.errors.climate, ctx.errors.gas
        );
        return true;
    }
    false
}
