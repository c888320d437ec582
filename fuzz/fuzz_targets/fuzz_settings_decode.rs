//! Fuzz target: `StoredSettings::decode`
//!
//! Decodes arbitrary 7-byte settings images and verifies:
//! - No panics for any byte pattern, including half-written cells
//! - Flag cells decode only from 0 or 1
//! - Merged settings re-encode to bytes that decode to the same values
//!
//! cargo fuzz run fuzz_settings_decode

#![no_main]

use envnode::config::SystemConfig;
use envnode::persistence::{PersistentSettings, SETTINGS_LEN, StoredSettings};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(bytes) = <[u8; SETTINGS_LEN]>::try_from(data) else {
        return;
    };

    let stored = StoredSettings::decode(&bytes);
    if stored.auto_light.is_some() {
        assert!(bytes[0] <= 1);
    }

    let merged = stored.merge(PersistentSettings::factory(&SystemConfig::default()));
    let again = StoredSettings::decode(&merged.encode()).merge(merged);
    assert_eq!(again.auto_light, merged.auto_light);
    assert_eq!(again.auto_temp, merged.auto_temp);
    assert_eq!(again.aux_leds, merged.aux_leds);
});
