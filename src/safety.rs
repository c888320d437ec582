//! Security monitor: gas-leak alarm.
//!
//! The alarm is a hysteresis latch over the gas reading:
//!
//! ```text
//!   gas > alarm            ──▶ raise (buzzer on)
//!   gas < safe             ──▶ clear (buzzer off)
//!   safe <= gas <= alarm   ──▶ hold
//! ```
//!
//! `alarm` and `safe` are derived from the calibrated baseline, so the
//! band moves with the sensor's clean-air reading.  `ALARM_OFF` clears
//! the latch unconditionally; if gas is still above `alarm`, the next
//! loop iteration raises it again.

use log::{error, info};

use crate::actuators::{Output, Transition};
use crate::app::context::ControllerContext;
use crate::app::ports::OutputPort;

/// Pure hysteresis rule.
pub fn next_alarm_state(raised: bool, gas: u16, alarm: u16, safe: u16) -> bool {
    if gas > alarm {
        true
    } else if gas < safe {
        false
    } else {
        raised
    }
}

/// Evaluate the latest gas reading and drive the buzzer on an edge.
pub fn evaluate(ctx: &mut ControllerContext, hw: &mut impl OutputPort) -> Transition {
    let gas = ctx.sensors.gas;
    let th = ctx.thresholds;
    let raised = next_alarm_state(ctx.alarm_active(), gas, th.gas_alarm, th.gas_safe);
    let transition = ctx.actuators.set(Output::Buzzer, raised, hw);
    match transition {
        Transition::SwitchedOn => error!("GAS ALARM: reading {gas} > {}", th.gas_alarm),
        Transition::SwitchedOff => info!("gas alarm cleared: reading {gas} < {}", th.gas_safe),
        Transition::Unchanged => {}
    }
    transition
}

/// Silence the alarm regardless of the current reading.
pub fn force_clear(ctx: &mut ControllerContext, hw: &mut impl OutputPort) -> Transition {
    let transition = ctx.actuators.set(Output::Buzzer, false, hw);
    if transition.changed() {
        info!("gas alarm silenced by operator");
    }
    transition
}
