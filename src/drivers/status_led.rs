//! Single-colour status LED driver.
//!
//! One GPIO, active high.  The blink patterns live in
//! [`indicator`](crate::indicator); this driver only drives the pin and
//! remembers the level it last wrote.

use crate::drivers::hw_init;
use crate::pins;

pub struct StatusLed {
    on: bool,
}

impl StatusLed {
    pub fn new() -> Self {
        Self { on: false }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(pins::STATUS_LED_GPIO, on);
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}
