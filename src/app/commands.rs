//! Inbound commands to the controller.
//!
//! Commands arrive as text lines on the serial link.  A line is trimmed,
//! upper-cased and matched exactly against [`VOCABULARY`]; nothing else
//! (no prefixes, no arguments) is accepted.

use core::fmt;

use crate::actuators::Output;

/// Every action the outside world can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch one output directly.
    SetOutput(Output, bool),
    /// Enable or disable the temperature alert.
    TempAlert(bool),
    /// Force-clear the gas alarm.
    AlarmOff,
    ToggleAutoLight,
    ToggleAutoTemp,
    /// Resume (`true`) or suspend every automatic rule.
    System(bool),
    CalibrateGas,
    ResetErrors,
    AllLightsOff,
    AllLedsOff,
    AllOff,
    /// Emit a telemetry record immediately.
    Status,
}

/// Canonical text ↔ command table.
pub const VOCABULARY: &[(&str, Command)] = &[
    ("LIVING_ON", Command::SetOutput(Output::LivingRoom, true)),
    ("LIVING_OFF", Command::SetOutput(Output::LivingRoom, false)),
    ("BEDROOM_ON", Command::SetOutput(Output::Bedroom, true)),
    ("BEDROOM_OFF", Command::SetOutput(Output::Bedroom, false)),
    ("KITCHEN_ON", Command::SetOutput(Output::Kitchen, true)),
    ("KITCHEN_OFF", Command::SetOutput(Output::Kitchen, false)),
    ("BATHROOM_ON", Command::SetOutput(Output::Bathroom, true)),
    ("BATHROOM_OFF", Command::SetOutput(Output::Bathroom, false)),
    ("LED_A2_ON", Command::SetOutput(Output::LedA2, true)),
    ("LED_A2_OFF", Command::SetOutput(Output::LedA2, false)),
    ("LED_A3_ON", Command::SetOutput(Output::LedA3, true)),
    ("LED_A3_OFF", Command::SetOutput(Output::LedA3, false)),
    ("LED_A4_ON", Command::SetOutput(Output::LedA4, true)),
    ("LED_A4_OFF", Command::SetOutput(Output::LedA4, false)),
    ("LED_A5_ON", Command::SetOutput(Output::LedA5, true)),
    ("LED_A5_OFF", Command::SetOutput(Output::LedA5, false)),
    ("FAN_ON", Command::SetOutput(Output::Fan, true)),
    ("FAN_OFF", Command::SetOutput(Output::Fan, false)),
    ("AC_ON", Command::SetOutput(Output::Ac, true)),
    ("AC_OFF", Command::SetOutput(Output::Ac, false)),
    ("TEMP_ALERT_ON", Command::TempAlert(true)),
    ("TEMP_ALERT_OFF", Command::TempAlert(false)),
    ("ALARM_OFF", Command::AlarmOff),
    ("AUTO_LIGHT_TOGGLE", Command::ToggleAutoLight),
    ("AUTO_TEMP_TOGGLE", Command::ToggleAutoTemp),
    ("SYSTEM_ENABLE", Command::System(true)),
    ("SYSTEM_DISABLE", Command::System(false)),
    ("CALIBRATE_GAS", Command::CalibrateGas),
    ("RESET_ERRORS", Command::ResetErrors),
    ("ALL_LIGHTS_OFF", Command::AllLightsOff),
    ("ALL_LEDS_OFF", Command::AllLedsOff),
    ("ALL_OFF", Command::AllOff),
    ("STATUS", Command::Status),
];

/// A line that did not match the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Carries the normalised (trimmed, upper-case) text.
    Unknown(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(text) => write!(f, "unknown command: {text}"),
        }
    }
}

impl core::error::Error for CommandError {}

impl Command {
    /// Parse one input line.
    ///
    /// Returns `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let normalised = line.trim().to_ascii_uppercase();
        if normalised.is_empty() {
            return Ok(None);
        }
        VOCABULARY
            .iter()
            .find(|(text, _)| *text == normalised)
            .map(|&(_, cmd)| Some(cmd))
            .ok_or(CommandError::Unknown(normalised))
    }

    /// Canonical wire text.
    pub fn as_str(self) -> &'static str {
        VOCABULARY
            .iter()
            .find(|&&(_, cmd)| cmd == self)
            .map_or("?", |&(text, _)| text)
    }

    /// Whether applying this command can change a persisted field.
    pub fn touches_persisted(self) -> bool {
        match self {
            Self::SetOutput(output, _) => output.is_persisted(),
            Self::ToggleAutoLight
            | Self::ToggleAutoTemp
            | Self::CalibrateGas
            | Self::AllLedsOff
            | Self::AllOff => true,
            _ => false,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
