//! Analog sensors on ADC1: the LDR light divider and the MQ-2 gas sensor.
//!
//! Both are reported on a 10-bit scale (0–1023).  The ESP32-S3 ADC
//! converts at 12 bits, so readings are shifted down by two.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 through the oneshot API (initialised by hw_init).
//! On host/test: reads from static atomics for injection.  The gas value
//! is signed so a simulation can inject out-of-range readings.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicI32, AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(not(target_os = "espidf"))]
static SIM_LDR: AtomicU16 = AtomicU16::new(600);
#[cfg(not(target_os = "espidf"))]
static SIM_GAS: AtomicI32 = AtomicI32::new(180);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_light(raw: u16) {
    SIM_LDR.store(raw, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gas(raw: i32) {
    SIM_GAS.store(raw, Ordering::Relaxed);
}

/// 12-bit conversion → 10-bit reading.
pub fn to_10_bit(raw12: u16) -> u16 {
    raw12.min(4095) >> 2
}

pub struct LightSensor;

impl LightSensor {
    pub fn read(&mut self) -> u16 {
        #[cfg(target_os = "espidf")]
        {
            hw_init::adc1_read(pins::LDR_ADC_CHANNEL).map_or(0, to_10_bit)
        }
        #[cfg(not(target_os = "espidf"))]
        {
            SIM_LDR.load(Ordering::Relaxed)
        }
    }
}

pub struct GasSensor;

impl GasSensor {
    /// Raw 10-bit reading, or `-1` if the conversion failed.
    pub fn read(&mut self) -> i32 {
        #[cfg(target_os = "espidf")]
        {
            hw_init::adc1_read(pins::GAS_ADC_CHANNEL).map_or(-1, |raw| i32::from(to_10_bit(raw)))
        }
        #[cfg(not(target_os = "espidf"))]
        {
            SIM_GAS.load(Ordering::Relaxed)
        }
    }
}
