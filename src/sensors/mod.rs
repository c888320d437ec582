//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! Drivers return raw values only.  Validation, error counting and the
//! snapshot update happen in [`acquisition`](crate::acquisition).

pub mod analog;
pub mod dht;
pub mod motion;

use analog::{GasSensor, LightSensor};
use dht::DhtSensor;
use motion::MotionSensor;

use crate::pins;

/// Owns every sensor driver on the board.
pub struct SensorHub {
    pub climate: DhtSensor,
    pub light: LightSensor,
    pub gas: GasSensor,
    pub motion: MotionSensor,
}

impl SensorHub {
    /// Build the hub with the board's pin assignments.
    pub fn new() -> Self {
        Self {
            climate: DhtSensor::new(pins::DHT_GPIO),
            light: LightSensor,
            gas: GasSensor,
            motion: MotionSensor::new(pins::PIR_GPIO),
        }
    }
}

impl Default for SensorHub {
    fn default() -> Self {
        Self::new()
    }
}
