//! GPIO / peripheral pin assignments for the envnode controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Room lighting relays (active HIGH)
// ---------------------------------------------------------------------------

pub const LIVING_ROOM_GPIO: i32 = 35;
pub const BEDROOM_GPIO: i32 = 36;
pub const KITCHEN_GPIO: i32 = 37;
pub const BATHROOM_GPIO: i32 = 38;

// ---------------------------------------------------------------------------
// Auxiliary LEDs A2–A5
// ---------------------------------------------------------------------------

/// A2 and A3 double as the temperature-alert blinkers.
pub const LED_A2_GPIO: i32 = 39;
pub const LED_A3_GPIO: i32 = 40;
pub const LED_A4_GPIO: i32 = 41;
pub const LED_A5_GPIO: i32 = 42;

// ---------------------------------------------------------------------------
// Climate relays, buzzer, status LED
// ---------------------------------------------------------------------------

pub const FAN_RELAY_GPIO: i32 = 47;
pub const AC_RELAY_GPIO: i32 = 48;
/// Piezo buzzer driven through a transistor (active HIGH).
pub const BUZZER_GPIO: i32 = 21;
/// Single-colour health beacon.
pub const STATUS_LED_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT22 single-wire data line (open drain, external pull-up).
pub const DHT_GPIO: i32 = 15;
/// HC-SR501 PIR output. HIGH = motion.
pub const PIR_GPIO: i32 = 16;
/// LDR voltage divider: ADC1 channel 3 (GPIO 4 on ESP32-S3).
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
pub const LDR_ADC_CHANNEL: u32 = 3;
/// MQ-2 gas sensor analog output: ADC1 channel 5 (GPIO 6 on ESP32-S3).
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
pub const GAS_ADC_CHANNEL: u32 = 5;

// ---------------------------------------------------------------------------
// Output groups
// ---------------------------------------------------------------------------

/// Every digital output driven by the controller, configured at boot.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
pub const OUTPUT_GPIOS: [i32; 12] = [
    LIVING_ROOM_GPIO,
    BEDROOM_GPIO,
    KITCHEN_GPIO,
    BATHROOM_GPIO,
    LED_A2_GPIO,
    LED_A3_GPIO,
    LED_A4_GPIO,
    LED_A5_GPIO,
    FAN_RELAY_GPIO,
    AC_RELAY_GPIO,
    BUZZER_GPIO,
    STATUS_LED_GPIO,
];
