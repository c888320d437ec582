//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (sensors, outputs, byte storage, clock, event sinks)
//! implement these traits.  The [`Controller`](super::service::Controller)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use embedded_hal::delay::DelayNs;

use crate::actuators::Output;
use crate::error::StorageError;

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One temperature/humidity sample.  Either field may be `NaN` when the
/// sensor failed to answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Read-side port: the domain calls this to obtain raw sensor data.
///
/// Each method performs exactly one physical read.  Validation and error
/// counting are the domain's job.
pub trait SensorPort {
    /// Read the temperature/humidity sensor.
    fn read_climate(&mut self) -> ClimateSample;

    /// Read the ambient light sensor (raw, 0–1023 when healthy).
    fn read_light(&mut self) -> u16;

    /// Read the gas sensor.  Signed so a failed conversion can surface as
    /// an out-of-range value.
    fn read_gas(&mut self) -> i32;

    /// Read the motion detector.
    fn read_motion(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: drives one physical line per call.
pub trait OutputPort {
    /// Drive `output` high (`true`) or low.
    fn write(&mut self, output: Output, on: bool);

    /// Drive the status beacon.
    fn set_status_led(&mut self, on: bool);
}

/// Everything the control loop needs from the board: sensors, outputs,
/// and a blocking delay for calibration.
pub trait Hardware: SensorPort + OutputPort + DelayNs {}

impl<T: SensorPort + OutputPort + DelayNs> Hardware for T {}

// ───────────────────────────────────────────────────────────────
// Byte storage port (driven adapter: domain ↔ EEPROM / flash)
// ───────────────────────────────────────────────────────────────

/// Byte-addressed non-volatile storage.
///
/// Erased cells read back as [`ERASED`](crate::persistence::ERASED).
pub trait ByteStore {
    /// Number of addressable bytes.
    fn capacity(&self) -> u16;

    /// Read one byte.
    fn read(&self, addr: u16) -> Result<u8, StorageError>;

    /// Write one byte.
    fn write(&mut self, addr: u16, value: u8) -> Result<(), StorageError>;

    /// Write only if the stored byte differs.  Returns `true` if a write
    /// happened.
    fn update(&mut self, addr: u16, value: u8) -> Result<bool, StorageError> {
        if self.read(addr)? == value {
            return Ok(false);
        }
        self.write(addr, value)?;
        Ok(true)
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock, zero at boot.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → serial / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go (serial link, log output, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

/// Fan an event out to two sinks.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}
