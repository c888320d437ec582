//! Actuator state: one two-state [`Switch`] per physical output.
//!
//! The logical value of every output lives here.  Physical writes go
//! through [`ActuatorBank`], which only touches a line when the logical
//! value actually flips, so repeated commands never re-toggle a relay.
//!
//! ```text
//!   command / rule ──▶ Switch::set ──▶ Transition ──▶ OutputPort::write
//!                                          │
//!                     display override ────┘ (A2/A3 only, while alerting)
//! ```
//!
//! A2 and A3 have a second layer: while the temperature alert is active
//! the blink loop installs a *display override* that owns both pins.  The
//! logical values keep tracking commands and are written back when the
//! override is removed.

use log::debug;

use crate::app::ports::OutputPort;
use crate::pins;

// ---------------------------------------------------------------------------
// Output identity
// ---------------------------------------------------------------------------

/// Every switchable output on the board (the status LED is driven by
/// the indicator and is not part of this set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Output {
    LivingRoom = 0,
    Bedroom = 1,
    Kitchen = 2,
    Bathroom = 3,
    LedA2 = 4,
    LedA3 = 5,
    LedA4 = 6,
    LedA5 = 7,
    Fan = 8,
    Ac = 9,
    Buzzer = 10,
}

impl Output {
    /// Total number of outputs: used to size the switch array.
    pub const COUNT: usize = 11;

    pub const ALL: [Output; Self::COUNT] = [
        Self::LivingRoom,
        Self::Bedroom,
        Self::Kitchen,
        Self::Bathroom,
        Self::LedA2,
        Self::LedA3,
        Self::LedA4,
        Self::LedA5,
        Self::Fan,
        Self::Ac,
        Self::Buzzer,
    ];

    pub const ROOM_LIGHTS: [Output; 4] = [
        Self::LivingRoom,
        Self::Bedroom,
        Self::Kitchen,
        Self::Bathroom,
    ];

    pub const AUX_LEDS: [Output; 4] = [Self::LedA2, Self::LedA3, Self::LedA4, Self::LedA5];

    /// LEDs that blink while the temperature alert is active.
    pub const fn is_alert_led(self) -> bool {
        matches!(self, Self::LedA2 | Self::LedA3)
    }

    /// LEDs whose state survives power loss.
    pub const fn is_persisted(self) -> bool {
        matches!(self, Self::LedA2 | Self::LedA3 | Self::LedA4 | Self::LedA5)
    }

    pub const fn gpio(self) -> i32 {
        match self {
            Self::LivingRoom => pins::LIVING_ROOM_GPIO,
            Self::Bedroom => pins::BEDROOM_GPIO,
            Self::Kitchen => pins::KITCHEN_GPIO,
            Self::Bathroom => pins::BATHROOM_GPIO,
            Self::LedA2 => pins::LED_A2_GPIO,
            Self::LedA3 => pins::LED_A3_GPIO,
            Self::LedA4 => pins::LED_A4_GPIO,
            Self::LedA5 => pins::LED_A5_GPIO,
            Self::Fan => pins::FAN_RELAY_GPIO,
            Self::Ac => pins::AC_RELAY_GPIO,
            Self::Buzzer => pins::BUZZER_GPIO,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::LivingRoom => "living_room",
            Self::Bedroom => "bedroom",
            Self::Kitchen => "kitchen",
            Self::Bathroom => "bathroom",
            Self::LedA2 => "led_a2",
            Self::LedA3 => "led_a3",
            Self::LedA4 => "led_a4",
            Self::LedA5 => "led_a5",
            Self::Fan => "fan",
            Self::Ac => "ac",
            Self::Buzzer => "buzzer",
        }
    }
}

// ---------------------------------------------------------------------------
// Switch
// ---------------------------------------------------------------------------

/// Result of asking a [`Switch`] for a new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    SwitchedOn,
    SwitchedOff,
}

impl Transition {
    pub fn changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// The level to write to the physical line, if any.
    pub fn level(self) -> Option<bool> {
        match self {
            Self::Unchanged => None,
            Self::SwitchedOn => Some(true),
            Self::SwitchedOff => Some(false),
        }
    }
}

/// An On/Off state machine.  `set` reports whether a side effect is due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Switch {
    on: bool,
}

impl Switch {
    pub fn is_on(self) -> bool {
        self.on
    }

    pub fn set(&mut self, on: bool) -> Transition {
        match (self.on, on) {
            (false, true) => {
                self.on = true;
                Transition::SwitchedOn
            }
            (true, false) => {
                self.on = false;
                Transition::SwitchedOff
            }
            _ => Transition::Unchanged,
        }
    }
}

// ---------------------------------------------------------------------------
// ActuatorBank
// ---------------------------------------------------------------------------

/// Logical state of every output plus the A2/A3 display override.
#[derive(Debug, Clone, Default)]
pub struct ActuatorBank {
    switches: [Switch; Output::COUNT],
    display_override: Option<bool>,
}

impl ActuatorBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical state of `output`.
    pub fn is_on(&self, output: Output) -> bool {
        self.switches[output as usize].is_on()
    }

    /// Level currently driven on the physical line.
    pub fn physical_level(&self, output: Output) -> bool {
        match self.display_override {
            Some(phase) if output.is_alert_led() => phase,
            _ => self.is_on(output),
        }
    }

    /// Set `output` and write the line if the logical state flipped.
    pub fn set(&mut self, output: Output, on: bool, hw: &mut impl OutputPort) -> Transition {
        let transition = self.stage(output, on);
        if let Some(level) = transition.level() {
            self.write_line(output, level, hw);
        }
        transition
    }

    /// Change the logical state only.  The caller owns the physical write.
    pub fn stage(&mut self, output: Output, on: bool) -> Transition {
        self.switches[output as usize].set(on)
    }

    /// Apply a group of targets as one step: every logical value is
    /// updated before any line is written.  Returns the number of outputs
    /// that changed.
    pub fn apply_group(&mut self, targets: &[(Output, bool)], hw: &mut impl OutputPort) -> usize {
        let mut changed: heapless::Vec<(Output, bool), { Output::COUNT }> = heapless::Vec::new();
        for &(output, on) in targets {
            if let Some(level) = self.stage(output, on).level() {
                // Capacity equals the number of outputs; duplicates in
                // `targets` cannot flip twice.
                let _ = changed.push((output, level));
            }
        }
        for &(output, level) in &changed {
            self.write_line(output, level, hw);
        }
        changed.len()
    }

    /// Current A2/A3 override phase, if the blink loop owns the pins.
    pub fn display_override(&self) -> Option<bool> {
        self.display_override
    }

    /// Install (or move) the A2/A3 override and drive both pins to `phase`.
    pub fn override_alert_leds(&mut self, phase: bool, hw: &mut impl OutputPort) {
        self.display_override = Some(phase);
        hw.write(Output::LedA2, phase);
        hw.write(Output::LedA3, phase);
    }

    /// Drop the override and restore A2/A3 to their logical state.
    pub fn release_alert_leds(&mut self, hw: &mut impl OutputPort) {
        if self.display_override.take().is_some() {
            hw.write(Output::LedA2, self.is_on(Output::LedA2));
            hw.write(Output::LedA3, self.is_on(Output::LedA3));
        }
    }

    /// Drive every line to its current level (boot-time sync).
    pub fn sync_all(&self, hw: &mut impl OutputPort) {
        for output in Output::ALL {
            hw.write(output, self.physical_level(output));
        }
    }

    fn write_line(&self, output: Output, level: bool, hw: &mut impl OutputPort) {
        if output.is_alert_led() && self.display_override.is_some() {
            debug!("{}: physical write deferred, alert blink owns the pin", output.name());
            return;
        }
        hw.write(output, level);
    }
}
