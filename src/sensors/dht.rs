//! DHT22 temperature/humidity sensor (single-wire, open drain).
//!
//! Protocol: the host pulls the line low for ~2 ms, releases it, the
//! sensor answers with an 80 µs low / 80 µs high preamble and then clocks
//! out 40 bits.  Each bit is a ~50 µs low followed by a high pulse whose
//! length encodes the value (~27 µs = 0, ~70 µs = 1).
//!
//! Frame: `[hum_hi, hum_lo, temp_hi, temp_lo, checksum]`, both values in
//! tenths, temperature sign in bit 15.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the data GPIO with busy-wait timing.
//! On host/test: reads two static `AtomicU32`s holding `f32` bits, so a
//! simulation can inject readings (including `NaN` for a dead sensor).

use core::fmt;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU32, Ordering};

use log::debug;

use crate::app::ports::ClimateSample;

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_BITS: AtomicU32 = AtomicU32::new(24.0f32.to_bits());
#[cfg(not(target_os = "espidf"))]
static SIM_HUMIDITY_BITS: AtomicU32 = AtomicU32::new(45.0f32.to_bits());

/// Inject the next climate reading (host builds).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_climate(temperature_c: f32, humidity_pct: f32) {
    SIM_TEMP_BITS.store(temperature_c.to_bits(), Ordering::Relaxed);
    SIM_HUMIDITY_BITS.store(humidity_pct.to_bits(), Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtError {
    /// The line did not reach the expected level in time.
    Timeout(&'static str),
    Checksum,
}

impl fmt::Display for DhtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(stage) => write!(f, "timeout waiting for {stage}"),
            Self::Checksum => write!(f, "checksum mismatch"),
        }
    }
}

/// Decode a 5-byte frame into `(temperature °C, humidity %)`.
pub fn decode_frame(frame: &[u8; 5]) -> Result<(f32, f32), DhtError> {
    let sum = frame[..4].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    if sum != frame[4] {
        return Err(DhtError::Checksum);
    }

    let raw_humidity = u16::from_be_bytes([frame[0], frame[1]]);
    let raw_temp = u16::from_be_bytes([frame[2], frame[3]]);

    let humidity = f32::from(raw_humidity) / 10.0;
    let mut temperature = f32::from(raw_temp & 0x7FFF) / 10.0;
    if raw_temp & 0x8000 != 0 {
        temperature = -temperature;
    }
    Ok((temperature, humidity))
}

pub struct DhtSensor {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    gpio: i32,
}

impl DhtSensor {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    /// Read once.  Any failure yields `NaN` in both fields.
    pub fn read(&mut self) -> ClimateSample {
        match self.read_values() {
            Ok((temperature_c, humidity_pct)) => ClimateSample {
                temperature_c,
                humidity_pct,
            },
            Err(e) => {
                debug!("dht: {e}");
                ClimateSample {
                    temperature_c: f32::NAN,
                    humidity_pct: f32::NAN,
                }
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_values(&mut self) -> Result<(f32, f32), DhtError> {
        Ok((
            f32::from_bits(SIM_TEMP_BITS.load(Ordering::Relaxed)),
            f32::from_bits(SIM_HUMIDITY_BITS.load(Ordering::Relaxed)),
        ))
    }

    #[cfg(target_os = "espidf")]
    fn read_values(&mut self) -> Result<(f32, f32), DhtError> {
        decode_frame(&self.read_frame()?)
    }

    #[cfg(target_os = "espidf")]
    fn read_frame(&mut self) -> Result<[u8; 5], DhtError> {
        use esp_idf_svc::sys::{esp_rom_delay_us, gpio_set_level};

        // SAFETY: the data pin was configured open-drain in hw_init; only
        // the main loop touches it.
        unsafe {
            gpio_set_level(self.gpio, 0);
            esp_rom_delay_us(2_000);
            gpio_set_level(self.gpio, 1);
            esp_rom_delay_us(30);
        }

        self.wait_for(false, 200, "response low")?;
        self.wait_for(true, 200, "response high")?;
        self.wait_for(false, 200, "data preamble")?;

        let mut frame = [0u8; 5];
        for byte in &mut frame {
            let mut value = 0u8;
            for _ in 0..8 {
                self.wait_for(true, 80, "bit high")?;
                let high_us = self.wait_for(false, 120, "bit low")?;
                value = (value << 1) | u8::from(high_us > 50);
            }
            *byte = value;
        }
        Ok(frame)
    }

    /// Busy-wait for the line to reach `high`.  Returns the wait in µs.
    #[cfg(target_os = "espidf")]
    fn wait_for(&self, high: bool, timeout_us: i64, stage: &'static str) -> Result<i64, DhtError> {
        use esp_idf_svc::sys::{esp_timer_get_time, gpio_get_level};

        // SAFETY: esp_timer_get_time and gpio_get_level are register reads.
        let start = unsafe { esp_timer_get_time() };
        loop {
            let now = unsafe { esp_timer_get_time() };
            if (unsafe { gpio_get_level(self.gpio) } != 0) == high {
                return Ok(now - start);
            }
            if now - start > timeout_us {
                return Err(DhtError::Timeout(stage));
            }
        }
    }
}
