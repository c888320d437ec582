//! Status indicator.
//!
//! One LED summarising system health, chosen fresh every loop iteration
//! by fixed priority:
//!
//! | Priority | Condition      | Pattern                      |
//! |----------|----------------|------------------------------|
//! | 1        | `system_error` | blink, 250 ms half-period    |
//! | 2        | gas alarm      | blink, 1000 ms half-period   |
//! | 3        | otherwise      | solid on                     |
//!
//! The pin is only written when its level changes.

use crate::app::context::ErrorCounters;
use crate::app::ports::OutputPort;
use crate::config::SystemConfig;

/// What the indicator should be showing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorMode {
    FaultBlink,
    AlarmBlink,
    Solid,
}

impl IndicatorMode {
    pub fn select(errors: &ErrorCounters, alarm_active: bool) -> Self {
        if errors.system_error {
            Self::FaultBlink
        } else if alarm_active {
            Self::AlarmBlink
        } else {
            Self::Solid
        }
    }

    fn half_period_ms(self, config: &SystemConfig) -> Option<u64> {
        match self {
            Self::FaultBlink => Some(u64::from(config.status_fault_blink_ms)),
            Self::AlarmBlink => Some(u64::from(config.status_alarm_blink_ms)),
            Self::Solid => None,
        }
    }
}

/// Square-wave generator for the status LED.
#[derive(Debug, Clone, Default)]
pub struct StatusIndicator {
    level: bool,
    last_toggle_ms: u64,
    written: Option<bool>,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(
        &mut self,
        mode: IndicatorMode,
        config: &SystemConfig,
        now_ms: u64,
        hw: &mut impl OutputPort,
    ) {
        match mode.half_period_ms(config) {
            Some(half) => {
                if now_ms.saturating_sub(self.last_toggle_ms) >= half {
                    self.level = !self.level;
                    self.last_toggle_ms = now_ms;
                }
            }
            None => self.level = true,
        }

        if self.written != Some(self.level) {
            hw.set_status_led(self.level);
            self.written = Some(self.level);
        }
    }
}
