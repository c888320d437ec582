//! Gas sensor calibration.
//!
//! Blocking: takes `calibration_samples` readings spaced
//! `calibration_spacing_ms` apart (about one second with the factory
//! settings) and averages the in-range ones.  Only called at boot and on
//! `CALIBRATE_GAS`, never from a timed task.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::acquisition::validate_gas;
use crate::app::ports::SensorPort;
use crate::config::SystemConfig;
use crate::error::SensorError;

/// Sample the gas sensor and return the new clean-air baseline.
///
/// Out-of-range samples are skipped.  If none are usable the caller keeps
/// its previous baseline.
pub fn calibrate<H>(hw: &mut H, config: &SystemConfig) -> Result<u16, SensorError>
where
    H: SensorPort + DelayNs,
{
    info!(
        "calibrating gas sensor: {} samples, {} ms apart",
        config.calibration_samples, config.calibration_spacing_ms
    );

    let mut sum: u32 = 0;
    let mut valid: u32 = 0;
    for i in 0..config.calibration_samples {
        match validate_gas(hw.read_gas(), config.gas_max_raw) {
            Ok(raw) => {
                debug!("calibration sample {i}: {raw}");
                sum += u32::from(raw);
                valid += 1;
            }
            Err(e) => warn!("calibration sample {i} discarded: {e}"),
        }
        hw.delay_ms(config.calibration_spacing_ms);
    }

    if valid == 0 {
        return Err(SensorError::NoValidSamples);
    }
    // Average of u16 samples fits in u16.
    Ok((sum / valid) as u16)
}
