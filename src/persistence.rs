//! Persisted user settings.
//!
//! Seven single-byte cells at fixed addresses:
//!
//! | Addr | Field          | Encoding                 |
//! |------|----------------|--------------------------|
//! | 0    | auto-light     | 0 / 1                    |
//! | 1    | auto-temp      | 0 / 1                    |
//! | 2    | gas baseline   | `baseline / 4`           |
//! | 3..7 | LED A2..A5     | 0 / 1                    |
//!
//! A cell holding [`ERASED`] was never written and leaves the default in
//! place.  A boolean cell holding anything other than 0 or 1 is treated
//! the same way.
//!
//! The baseline quantisation drops the low two bits.  A baseline of 1020
//! or more encodes as `0xFF` and therefore reads back as "unset"; the
//! layout is shared with existing boards, so this is kept as is.

use log::{info, warn};

use crate::app::ports::ByteStore;
use crate::config::SystemConfig;
use crate::error::StorageError;

/// Value of a never-written cell.
pub const ERASED: u8 = 0xFF;

pub const ADDR_AUTO_LIGHT: u16 = 0;
pub const ADDR_AUTO_TEMP: u16 = 1;
pub const ADDR_GAS_BASELINE: u16 = 2;
/// A2 at 3, A3 at 4, A4 at 5, A5 at 6.
pub const ADDR_LED_BASE: u16 = 3;

/// Number of cells in the layout.
pub const SETTINGS_LEN: usize = 7;

// ---------------------------------------------------------------------------
// Quantisation
// ---------------------------------------------------------------------------

/// Baseline → stored byte.
pub fn quantize_baseline(baseline: u16) -> u8 {
    u8::try_from(baseline / 4).unwrap_or(u8::MAX)
}

/// Stored byte → baseline.
pub fn dequantize_baseline(byte: u8) -> u16 {
    u16::from(byte) * 4
}

fn decode_bool(byte: u8) -> Option<bool> {
    match byte {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// The in-memory settings that survive power loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistentSettings {
    pub auto_light: bool,
    pub auto_temp: bool,
    pub gas_baseline: u16,
    /// A2, A3, A4, A5.
    pub aux_leds: [bool; 4],
}

impl PersistentSettings {
    /// Settings of a board that has never been configured.
    pub fn factory(config: &SystemConfig) -> Self {
        Self {
            auto_light: true,
            auto_temp: true,
            gas_baseline: config.default_gas_baseline,
            aux_leds: [false; 4],
        }
    }

    pub fn encode(&self) -> [u8; SETTINGS_LEN] {
        let [a2, a3, a4, a5] = self.aux_leds.map(u8::from);
        [
            u8::from(self.auto_light),
            u8::from(self.auto_temp),
            quantize_baseline(self.gas_baseline),
            a2,
            a3,
            a4,
            a5,
        ]
    }
}

/// What was found in storage, field by field.  `None` means the cell was
/// erased or held an invalid value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoredSettings {
    pub auto_light: Option<bool>,
    pub auto_temp: Option<bool>,
    pub gas_baseline: Option<u16>,
    pub aux_leds: [Option<bool>; 4],
}

impl StoredSettings {
    pub fn decode(bytes: &[u8; SETTINGS_LEN]) -> Self {
        let baseline = bytes[ADDR_GAS_BASELINE as usize];
        let led = |i: usize| decode_bool(bytes[ADDR_LED_BASE as usize + i]);
        Self {
            auto_light: decode_bool(bytes[ADDR_AUTO_LIGHT as usize]),
            auto_temp: decode_bool(bytes[ADDR_AUTO_TEMP as usize]),
            gas_baseline: (baseline != ERASED).then(|| dequantize_baseline(baseline)),
            aux_leds: [led(0), led(1), led(2), led(3)],
        }
    }

    /// Overlay present fields on `defaults`.
    pub fn merge(&self, defaults: PersistentSettings) -> PersistentSettings {
        let mut aux_leds = defaults.aux_leds;
        for (slot, stored) in aux_leds.iter_mut().zip(self.aux_leds) {
            if let Some(on) = stored {
                *slot = on;
            }
        }
        PersistentSettings {
            auto_light: self.auto_light.unwrap_or(defaults.auto_light),
            auto_temp: self.auto_temp.unwrap_or(defaults.auto_temp),
            gas_baseline: self.gas_baseline.unwrap_or(defaults.gas_baseline),
            aux_leds,
        }
    }
}

// ---------------------------------------------------------------------------
// Store access
// ---------------------------------------------------------------------------

/// The settings block must fit entirely; a short store is rejected before
/// any cell is touched.
fn check_fits(store: &impl ByteStore) -> Result<(), StorageError> {
    if usize::from(store.capacity()) < SETTINGS_LEN {
        return Err(StorageError::AddressOutOfRange(store.capacity()));
    }
    Ok(())
}

/// Read and decode the settings cells.
pub fn read_stored(store: &impl ByteStore) -> Result<StoredSettings, StorageError> {
    check_fits(store)?;
    let mut bytes = [ERASED; SETTINGS_LEN];
    for (addr, byte) in (0u16..).zip(bytes.iter_mut()) {
        *byte = store.read(addr)?;
    }
    for (addr, &byte) in bytes.iter().enumerate() {
        let is_flag = addr != ADDR_GAS_BASELINE as usize;
        if is_flag && byte != ERASED && decode_bool(byte).is_none() {
            warn!("settings cell {addr} holds invalid value {byte:#04x}, using default");
        }
    }
    let stored = StoredSettings::decode(&bytes);
    Ok(stored)
}

/// Load settings, falling back to defaults for anything missing.
pub fn load(store: &impl ByteStore, defaults: PersistentSettings) -> (PersistentSettings, StoredSettings) {
    match read_stored(store) {
        Ok(stored) => (stored.merge(defaults), stored),
        Err(e) => {
            warn!("settings read failed ({e}), using defaults");
            (defaults, StoredSettings::default())
        }
    }
}

/// Write every cell, skipping those that already hold the right value.
/// Returns the number of bytes actually written.
pub fn save(store: &mut impl ByteStore, settings: &PersistentSettings) -> Result<usize, StorageError> {
    check_fits(store)?;
    let mut written = 0;
    for (addr, byte) in (0u16..).zip(settings.encode()) {
        if store.update(addr, byte)? {
            written += 1;
        }
    }
    if written > 0 {
        info!("settings saved ({written} byte(s) changed)");
    }
    Ok(written)
}
