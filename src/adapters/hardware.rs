//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the status LED, exposing them through
//! [`SensorPort`], [`OutputPort`] and [`DelayNs`].  This is the only
//! module in the system that touches actual hardware.  On non-espidf
//! targets, the underlying drivers use cfg-gated simulation stubs.

use std::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::actuators::Output;
use crate::app::ports::{ClimateSample, OutputPort, SensorPort};
use crate::drivers::hw_init;
use crate::drivers::status_led::StatusLed;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    status_led: StatusLed,
}

impl HardwareAdapter {
    pub fn new(sensor_hub: SensorHub, status_led: StatusLed) -> Self {
        Self {
            sensor_hub,
            status_led,
        }
    }

    pub fn status_led(&self) -> &StatusLed {
        &self.status_led
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_climate(&mut self) -> ClimateSample {
        self.sensor_hub.climate.read()
    }

    fn read_light(&mut self) -> u16 {
        self.sensor_hub.light.read()
    }

    fn read_gas(&mut self) -> i32 {
        self.sensor_hub.gas.read()
    }

    fn read_motion(&mut self) -> bool {
        self.sensor_hub.motion.read()
    }
}

// ── OutputPort implementation ─────────────────────────────────

impl OutputPort for HardwareAdapter {
    fn write(&mut self, output: Output, on: bool) {
        hw_init::gpio_write(output.gpio(), on);
    }

    fn set_status_led(&mut self, on: bool) {
        self.status_led.set(on);
    }
}

// ── Blocking delay (gas calibration) ──────────────────────────

impl DelayNs for HardwareAdapter {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
