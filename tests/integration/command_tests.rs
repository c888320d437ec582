//! Serial command tests: vocabulary, acknowledgements, side effects.

use envnode::actuators::Output;
use envnode::app::commands::Command;
use envnode::app::events::AppEvent;
use envnode::app::service::Controller;
use envnode::config::SystemConfig;
use envnode::error::StorageError;

use crate::mock_hw::{MemStore, MockHardware, RecordingSink};

const BASELINE_320: [u8; 7] = [1, 1, 80, 0, 0, 0, 0];

struct Rig {
    controller: Controller,
    hw: MockHardware,
    store: MemStore,
    sink: RecordingSink,
}

impl Rig {
    fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    fn with_config(config: SystemConfig) -> Self {
        let mut hw = MockHardware::new();
        let mut store = MemStore::with_cells(&BASELINE_320);
        let mut sink = RecordingSink::new();
        let mut controller = Controller::new(config);
        controller.start(&mut hw, &mut store, &mut sink);
        hw.clear_log();
        sink.clear();
        Self {
            controller,
            hw,
            store,
            sink,
        }
    }

    fn send(&mut self, line: &str, now_ms: u64) {
        self.controller
            .handle_line(line, now_ms, &mut self.hw, &mut self.store, &mut self.sink);
    }

    fn tick(&mut self, now_ms: u64) {
        self.controller
            .run_once(now_ms, &mut self.hw, &mut self.store, &mut self.sink, None);
    }

    fn is_on(&self, output: Output) -> bool {
        self.controller.context().actuators.is_on(output)
    }
}

// ── Parsing and acknowledgement ───────────────────────────────

#[test]
fn unknown_command_is_rejected_without_side_effects() {
    let mut rig = Rig::new();
    let before = rig.controller.context().persistent_settings();

    rig.send("FOO", 10);

    assert_eq!(rig.sink.events, vec![AppEvent::CommandRejected("FOO".into())]);
    assert!(rig.hw.writes.is_empty());
    assert_eq!(rig.store.writes, 0);
    assert_eq!(rig.controller.context().persistent_settings(), before);
}

#[test]
fn blank_line_is_ignored() {
    let mut rig = Rig::new();
    rig.send("   \r\n", 10);
    assert!(rig.sink.events.is_empty());
}

#[test]
fn commands_are_case_insensitive_and_acknowledged() {
    let mut rig = Rig::new();
    rig.send("  kitchen_on\r", 10);

    assert!(rig.is_on(Output::Kitchen));
    assert_eq!(
        rig.sink.events,
        vec![AppEvent::CommandAccepted(Command::SetOutput(Output::Kitchen, true))]
    );
}

#[test]
fn run_once_handles_the_line_after_the_rules() {
    let mut rig = Rig::new();
    rig.hw.temperature_c = 29.0;
    rig.controller
        .run_once(1000, &mut rig.hw, &mut rig.store, &mut rig.sink, Some("FAN_OFF"));

    // The sensor tick switched the fan on, the command switched it off.
    assert_eq!(rig.hw.writes_to(Output::Fan), vec![true, false]);
    assert!(!rig.is_on(Output::Fan));
}

// ── Output commands ───────────────────────────────────────────

#[test]
fn repeated_command_writes_the_line_once() {
    let mut rig = Rig::new();
    rig.send("LIVING_ON", 10);
    rig.send("LIVING_ON", 20);

    assert_eq!(rig.hw.writes_to(Output::LivingRoom), vec![true]);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::CommandAccepted(_))), 2);
}

#[test]
fn room_lights_are_not_persisted() {
    let mut rig = Rig::new();
    rig.send("BEDROOM_ON", 10);
    assert_eq!(rig.store.writes, 0);
}

#[test]
fn aux_led_commands_are_persisted() {
    let mut rig = Rig::new();
    rig.send("LED_A4_ON", 10);

    assert_eq!(rig.store.cells[5], 1);
    assert_eq!(rig.store.writes, 1);
}

#[test]
fn all_off_switches_everything_but_the_buzzer() {
    let mut rig = Rig::new();
    for line in ["LIVING_ON", "BATHROOM_ON", "LED_A5_ON", "FAN_ON", "AC_ON"] {
        rig.send(line, 10);
    }
    // Warm enough that the climate rule keeps the fan and AC on.
    rig.hw.temperature_c = 29.0;
    rig.hw.gas = 700;
    rig.tick(1000);
    assert!(rig.controller.context().alarm_active());
    rig.hw.clear_log();

    rig.send("ALL_OFF", 1100);

    for output in Output::ALL {
        if output == Output::Buzzer {
            continue;
        }
        assert!(!rig.is_on(output), "{} still on", output.name());
    }
    assert!(rig.controller.context().alarm_active());
    assert!(rig.hw.writes_to(Output::Buzzer).is_empty());
    // Only the five outputs that were on get a write.
    assert_eq!(rig.hw.writes.len(), 5);
    assert_eq!(rig.store.cells[6], 0);
}

#[test]
fn all_lights_off_leaves_leds_alone() {
    let mut rig = Rig::new();
    rig.send("KITCHEN_ON", 10);
    rig.send("LED_A3_ON", 10);
    rig.send("ALL_LIGHTS_OFF", 20);

    assert!(!rig.is_on(Output::Kitchen));
    assert!(rig.is_on(Output::LedA3));
}

#[test]
fn all_leds_off_persists_the_cleared_leds() {
    let mut rig = Rig::new();
    rig.send("LED_A2_ON", 10);
    rig.send("LED_A3_ON", 10);
    rig.send("ALL_LEDS_OFF", 20);

    assert_eq!(rig.store.cells[3..7], [0, 0, 0, 0]);
    assert!(Output::AUX_LEDS.iter().all(|&led| !rig.is_on(led)));
}

// ── Interaction with the alert blink ──────────────────────────

#[test]
fn led_a2_command_during_alert_is_deferred_until_the_alert_ends() {
    let mut rig = Rig::new();
    rig.hw.temperature_c = 40.0;
    rig.tick(1000);
    assert!(rig.controller.context().alert.active);
    rig.hw.clear_log();

    rig.send("LED_A2_ON", 1100);
    assert!(rig.is_on(Output::LedA2));
    assert!(rig.hw.writes_to(Output::LedA2).is_empty(), "blink owns the pin");

    let telemetry_led = {
        rig.send("STATUS", 1200);
        rig.sink.last_telemetry().unwrap().led_a2
    };
    assert!(telemetry_led, "telemetry reports the logical value");

    rig.send("TEMP_ALERT_OFF", 1300);
    assert!(!rig.controller.context().alert.active);
    assert_eq!(rig.hw.level(Output::LedA2), Some(true));
    assert_eq!(rig.hw.level(Output::LedA3), Some(false));
    assert!(rig.sink.events.contains(&AppEvent::AlertChanged(false)));
}

#[test]
fn disabled_alert_stays_quiet() {
    let mut rig = Rig::new();
    rig.send("TEMP_ALERT_OFF", 10);
    rig.hw.temperature_c = 40.0;
    rig.tick(1000);
    assert!(!rig.controller.context().alert.active);

    rig.send("TEMP_ALERT_ON", 1100);
    rig.tick(2000);
    assert!(rig.controller.context().alert.active);
}

// ── Modes, alarm, calibration ─────────────────────────────────

#[test]
fn alarm_off_holds_only_until_the_next_iteration_while_gas_stays_high() {
    let mut rig = Rig::new();
    rig.hw.gas = 700;
    rig.tick(1000);
    rig.send("ALARM_OFF", 1100);
    assert!(!rig.controller.context().alarm_active());
    assert!(rig.sink.events.contains(&AppEvent::AlarmChanged(false)));

    let reads = rig.hw.gas_reads;
    rig.tick(1110);
    assert_eq!(rig.hw.gas_reads, reads, "no new reading between sensor ticks");
    assert!(rig.controller.context().alarm_active(), "gas is still high");
    assert_eq!(rig.hw.writes_to(Output::Buzzer), vec![true, false, true]);
}

#[test]
fn alarm_off_inside_the_band_stays_silent() {
    let mut rig = Rig::new();
    rig.hw.gas = 700;
    rig.tick(1000);
    rig.hw.gas = 450;
    rig.tick(2000);
    rig.send("ALARM_OFF", 2100);

    rig.tick(2110);
    rig.tick(3000);
    assert!(!rig.controller.context().alarm_active(), "450 is inside the band");
}

#[test]
fn auto_toggles_flip_and_persist() {
    let mut rig = Rig::new();
    rig.send("AUTO_LIGHT_TOGGLE", 10);
    assert!(!rig.controller.context().modes.auto_light);
    assert_eq!(rig.store.cells[0], 0);

    rig.send("AUTO_TEMP_TOGGLE", 20);
    rig.send("AUTO_TEMP_TOGGLE", 30);
    assert!(rig.controller.context().modes.auto_temp);
    assert_eq!(rig.store.cells[1], 1);

    rig.hw.light = 10;
    rig.hw.motion = true;
    rig.tick(1000);
    assert!(!rig.is_on(Output::LivingRoom));
}

#[test]
fn calibrate_gas_updates_thresholds_and_storage() {
    let mut rig = Rig::new();
    rig.hw.gas = 240;
    rig.send("CALIBRATE_GAS", 10);

    let ctx = rig.controller.context();
    assert_eq!(ctx.gas_baseline, 240);
    assert_eq!((ctx.thresholds.gas_alarm, ctx.thresholds.gas_safe), (440, 340));
    assert_eq!(rig.store.cells[2], 60);
    assert!(rig.sink.events.contains(&AppEvent::Calibrated {
        baseline: 240,
        alarm: 440,
        safe: 340,
    }));
}

#[test]
fn failed_calibration_keeps_the_old_baseline() {
    let mut rig = Rig::new();
    rig.hw.gas = -1;
    rig.send("CALIBRATE_GAS", 10);

    assert_eq!(rig.controller.context().gas_baseline, 320);
    assert!(rig.sink.events.contains(&AppEvent::CalibrationFailed));
    assert_eq!(rig.store.cells[2], 80);
}

#[test]
fn reset_errors_clears_counters_and_flag() {
    let mut rig = Rig::new();
    rig.hw.climate_failure();
    for now in (1000..=6000).step_by(1000) {
        rig.tick(now);
    }
    assert!(rig.controller.context().errors.system_error);

    rig.send("RESET_ERRORS", 6100);
    let errors = rig.controller.context().errors;
    assert!(!errors.system_error);
    assert_eq!(errors.climate, 0);
    assert!(rig.sink.events.contains(&AppEvent::SystemErrorChanged(false)));
}

#[test]
fn status_emits_a_report_on_demand() {
    let mut rig = Rig::new();
    rig.send("STATUS", 3456);

    let record = rig.sink.last_telemetry().unwrap();
    assert_eq!(record.uptime, 3);
    assert_eq!(record.gas_baseline, 320);
    assert_eq!(rig.sink.events.last(), Some(&AppEvent::CommandAccepted(Command::Status)));
}

#[test]
fn storage_failure_is_reported_but_state_changes() {
    let mut rig = Rig::new();
    rig.store.broken = true;
    rig.send("LED_A5_ON", 10);

    assert!(rig.is_on(Output::LedA5));
    assert!(rig.sink.events.contains(&AppEvent::StorageFailed(StorageError::Io)));
}
