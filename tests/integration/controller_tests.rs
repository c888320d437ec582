//! Controller lifecycle and rule-engine tests.
//!
//! Drives `Controller::run_once` with explicit timestamps.  With the
//! factory timing the sensor tick fires at 1000, 2000, ... and telemetry
//! at 2000, 4000, ...

use envnode::actuators::Output;
use envnode::app::events::AppEvent;
use envnode::app::service::Controller;
use envnode::config::SystemConfig;

use crate::mock_hw::{MemStore, MockHardware, RecordingSink};

/// Stored settings: auto-light on, auto-temp on, baseline 320, LEDs off.
const BASELINE_320: [u8; 7] = [1, 1, 80, 0, 0, 0, 0];

fn boot(config: SystemConfig, hw: &mut MockHardware, store: &mut MemStore) -> (Controller, RecordingSink) {
    let mut controller = Controller::new(config);
    let mut sink = RecordingSink::new();
    controller.start(hw, store, &mut sink);
    (controller, sink)
}

fn tick(
    controller: &mut Controller,
    now_ms: u64,
    hw: &mut MockHardware,
    store: &mut MemStore,
    sink: &mut RecordingSink,
) {
    controller.run_once(now_ms, hw, store, sink, None);
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn first_boot_calibrates_and_persists_the_baseline() {
    let mut hw = MockHardware::new();
    let mut store = MemStore::erased();
    let (controller, sink) = boot(SystemConfig::default(), &mut hw, &mut store);

    assert_eq!(hw.gas_reads, 10);
    assert_eq!(hw.slept_ms, 1000);
    assert!(sink.events.contains(&AppEvent::Calibrated {
        baseline: 180,
        alarm: 380,
        safe: 280,
    }));
    assert_eq!(store.cells[..7], [1, 1, 45, 0, 0, 0, 0]);
    assert_eq!(store.writes, 7);
    assert_eq!(controller.context().gas_baseline, 180);
    assert_eq!(sink.events.last(), Some(&AppEvent::Started { gas_baseline: 180 }));
}

#[test]
fn boot_with_stored_baseline_skips_calibration() {
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&[1, 0, 80, 1, 0, 0, 0]);
    let (controller, sink) = boot(SystemConfig::default(), &mut hw, &mut store);

    let ctx = controller.context();
    assert_eq!(hw.gas_reads, 0);
    assert_eq!(store.writes, 0);
    assert_eq!(ctx.gas_baseline, 320);
    assert_eq!((ctx.thresholds.gas_alarm, ctx.thresholds.gas_safe), (520, 420));
    assert!(ctx.modes.auto_light);
    assert!(!ctx.modes.auto_temp);
    assert!(ctx.actuators.is_on(Output::LedA2));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Calibrated { .. })), 0);
}

#[test]
fn boot_drives_every_output_once() {
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&[1, 1, 80, 0, 0, 1, 0]);
    boot(SystemConfig::default(), &mut hw, &mut store);

    assert_eq!(hw.writes.len(), Output::COUNT);
    for output in Output::ALL {
        assert_eq!(hw.writes_to(output), vec![output == Output::LedA4], "{}", output.name());
    }
}

// ── Scheduling ────────────────────────────────────────────────

#[test]
fn sensors_and_telemetry_run_on_their_own_intervals() {
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&BASELINE_320);
    let (mut controller, mut sink) = boot(SystemConfig::default(), &mut hw, &mut store);

    for now in (0..=4000).step_by(10) {
        tick(&mut controller, now, &mut hw, &mut store, &mut sink);
    }

    let reports = sink.count(|e| matches!(e, AppEvent::Telemetry(_)));
    assert_eq!(reports, 2);
    // Four sensor ticks, one gas read each.
    assert_eq!(hw.gas_reads, 4);
    let record = sink.last_telemetry().unwrap();
    assert_eq!(record.uptime, 4);
    assert!((record.temperature - 22.0).abs() < 1e-4);
}

// ── Gas safety ────────────────────────────────────────────────

#[test]
fn gas_alarm_follows_the_hysteresis_band() {
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&BASELINE_320);
    let (mut controller, mut sink) = boot(SystemConfig::default(), &mut hw, &mut store);
    hw.clear_log();

    hw.gas = 600;
    tick(&mut controller, 1000, &mut hw, &mut store, &mut sink);
    assert!(controller.context().alarm_active());
    assert!(sink.events.contains(&AppEvent::AlarmChanged(true)));

    hw.gas = 450;
    tick(&mut controller, 2000, &mut hw, &mut store, &mut sink);
    assert!(controller.context().alarm_active(), "450 is inside the band");
    assert!(sink.last_telemetry().unwrap().alarm);

    hw.gas = 400;
    tick(&mut controller, 3000, &mut hw, &mut store, &mut sink);
    assert!(!controller.context().alarm_active());

    assert_eq!(hw.writes_to(Output::Buzzer), vec![true, false]);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::AlarmChanged(_))), 2);
}

#[test]
fn status_led_blinks_while_the_alarm_is_raised() {
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&BASELINE_320);
    let (mut controller, mut sink) = boot(SystemConfig::default(), &mut hw, &mut store);

    tick(&mut controller, 500, &mut hw, &mut store, &mut sink);
    assert_eq!(hw.status, vec![true], "solid while healthy");

    hw.gas = 700;
    for now in (1000..=4000).step_by(100) {
        tick(&mut controller, now, &mut hw, &mut store, &mut sink);
    }
    assert!(hw.status.len() >= 3);
    assert!(hw.status.windows(2).all(|w| w[0] != w[1]));
}

// ── Temperature alert ─────────────────────────────────────────

#[test]
fn alert_blinks_a2_a3_and_restores_them_afterwards() {
    let config = SystemConfig {
        temp_low_alert_c: 22.5,
        temp_high_alert_c: 24.0,
        ..SystemConfig::default()
    };
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&BASELINE_320);
    let (mut controller, mut sink) = boot(config, &mut hw, &mut store);
    hw.clear_log();

    hw.temperature_c = 23.0;
    tick(&mut controller, 1000, &mut hw, &mut store, &mut sink);
    assert!(!controller.context().alert.active);

    hw.temperature_c = 26.0;
    tick(&mut controller, 2000, &mut hw, &mut store, &mut sink);
    assert!(controller.context().alert.active);
    assert!(sink.events.contains(&AppEvent::AlertChanged(true)));

    tick(&mut controller, 2500, &mut hw, &mut store, &mut sink);

    hw.temperature_c = 23.0;
    tick(&mut controller, 3000, &mut hw, &mut store, &mut sink);
    assert!(!controller.context().alert.active);
    assert!(sink.events.contains(&AppEvent::AlertChanged(false)));

    assert_eq!(hw.writes_to(Output::LedA2), vec![true, false, false]);
    assert_eq!(hw.writes_to(Output::LedA3), vec![true, false, false]);
    assert!(!controller.context().actuators.is_on(Output::LedA2));
}

#[test]
fn failed_climate_read_neither_raises_nor_clears_the_alert() {
    let config = SystemConfig {
        temp_low_alert_c: 22.5,
        temp_high_alert_c: 24.0,
        ..SystemConfig::default()
    };
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&BASELINE_320);
    let (mut controller, mut sink) = boot(config, &mut hw, &mut store);

    hw.temperature_c = 30.0;
    tick(&mut controller, 1000, &mut hw, &mut store, &mut sink);
    assert!(controller.context().alert.active);

    hw.climate_failure();
    tick(&mut controller, 2000, &mut hw, &mut store, &mut sink);
    assert!(controller.context().alert.active);
    assert_eq!(controller.context().errors.climate, 1);
    assert!((controller.context().sensors.temperature_c - 30.0).abs() < 1e-4);
}

// ── Automation ────────────────────────────────────────────────

#[test]
fn motion_in_the_dark_lights_the_living_room_until_timeout() {
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&BASELINE_320);
    let (mut controller, mut sink) = boot(SystemConfig::default(), &mut hw, &mut store);
    hw.clear_log();

    hw.light = 100;
    hw.motion = true;
    tick(&mut controller, 1000, &mut hw, &mut store, &mut sink);
    assert!(controller.context().actuators.is_on(Output::LivingRoom));

    hw.motion = false;
    tick(&mut controller, 31_000, &mut hw, &mut store, &mut sink);
    assert!(controller.context().actuators.is_on(Output::LivingRoom));

    tick(&mut controller, 32_000, &mut hw, &mut store, &mut sink);
    assert!(!controller.context().actuators.is_on(Output::LivingRoom));
    assert_eq!(hw.writes_to(Output::LivingRoom), vec![true, false]);
}

#[test]
fn motion_timeout_fires_between_sensor_ticks() {
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&BASELINE_320);
    let (mut controller, mut sink) = boot(SystemConfig::default(), &mut hw, &mut store);

    hw.light = 100;
    hw.motion = true;
    tick(&mut controller, 1000, &mut hw, &mut store, &mut sink);
    hw.motion = false;
    tick(&mut controller, 2000, &mut hw, &mut store, &mut sink);
    tick(&mut controller, 30_950, &mut hw, &mut store, &mut sink);
    assert!(controller.context().actuators.is_on(Output::LivingRoom));

    let reads = hw.gas_reads;
    tick(&mut controller, 31_050, &mut hw, &mut store, &mut sink);
    assert_eq!(hw.gas_reads, reads, "31 050 is not a sensor tick");
    assert!(!controller.context().actuators.is_on(Output::LivingRoom));
}

#[test]
fn motion_in_daylight_does_nothing() {
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&BASELINE_320);
    let (mut controller, mut sink) = boot(SystemConfig::default(), &mut hw, &mut store);
    hw.clear_log();

    hw.motion = true;
    tick(&mut controller, 1000, &mut hw, &mut store, &mut sink);
    assert!(hw.writes_to(Output::LivingRoom).is_empty());
}

#[test]
fn fan_and_ac_follow_temperature() {
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&BASELINE_320);
    let (mut controller, mut sink) = boot(SystemConfig::default(), &mut hw, &mut store);
    hw.clear_log();

    hw.temperature_c = 29.0;
    tick(&mut controller, 1000, &mut hw, &mut store, &mut sink);
    let ctx = controller.context();
    assert!(ctx.actuators.is_on(Output::Fan));
    assert!(!ctx.actuators.is_on(Output::Ac));

    hw.temperature_c = 31.0;
    tick(&mut controller, 2000, &mut hw, &mut store, &mut sink);
    assert!(controller.context().actuators.is_on(Output::Ac));

    hw.temperature_c = 27.0;
    tick(&mut controller, 3000, &mut hw, &mut store, &mut sink);
    let ctx = controller.context();
    assert!(ctx.actuators.is_on(Output::Fan), "27 is inside the fan band");
    assert!(ctx.actuators.is_on(Output::Ac));

    hw.temperature_c = 25.0;
    tick(&mut controller, 4000, &mut hw, &mut store, &mut sink);
    let ctx = controller.context();
    assert!(!ctx.actuators.is_on(Output::Fan));
    assert!(!ctx.actuators.is_on(Output::Ac));

    assert_eq!(hw.writes_to(Output::Fan), vec![true, false]);
    assert_eq!(hw.writes_to(Output::Ac), vec![true, false]);
}

// ── Fault handling ────────────────────────────────────────────

#[test]
fn system_error_latches_and_releases_after_a_clean_report() {
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&BASELINE_320);
    let (mut controller, mut sink) = boot(SystemConfig::default(), &mut hw, &mut store);

    hw.climate_failure();
    for now in (1000..=5000).step_by(1000) {
        tick(&mut controller, now, &mut hw, &mut store, &mut sink);
    }
    assert!(!controller.context().errors.system_error, "five failures are tolerated");

    tick(&mut controller, 6000, &mut hw, &mut store, &mut sink);
    assert!(controller.context().errors.system_error);
    assert_eq!(sink.count(|e| *e == AppEvent::SystemErrorChanged(true)), 1);

    hw.temperature_c = 22.0;
    hw.humidity_pct = 40.0;
    tick(&mut controller, 7000, &mut hw, &mut store, &mut sink);
    assert!(controller.context().errors.system_error, "released only by a report");

    tick(&mut controller, 8000, &mut hw, &mut store, &mut sink);
    let record = sink.last_telemetry().unwrap();
    assert!(record.system_error, "the releasing report still shows the error");
    assert!(!controller.context().errors.system_error);
    assert_eq!(sink.events.last(), Some(&AppEvent::SystemErrorChanged(false)));
}

#[test]
fn gas_sensor_failures_keep_the_last_good_value() {
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&BASELINE_320);
    let (mut controller, mut sink) = boot(SystemConfig::default(), &mut hw, &mut store);

    hw.gas = 250;
    tick(&mut controller, 1000, &mut hw, &mut store, &mut sink);
    hw.gas = -1;
    tick(&mut controller, 2000, &mut hw, &mut store, &mut sink);

    let ctx = controller.context();
    assert_eq!(ctx.sensors.gas, 250);
    assert_eq!(ctx.errors.gas, 1);
    assert_eq!(sink.last_telemetry().unwrap().gas_errors, 1);
}

// ── System enable ─────────────────────────────────────────────

#[test]
fn disabled_system_still_acquires_but_never_actuates() {
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&BASELINE_320);
    let (mut controller, mut sink) = boot(SystemConfig::default(), &mut hw, &mut store);
    controller.run_once(500, &mut hw, &mut store, &mut sink, Some("SYSTEM_DISABLE"));
    hw.clear_log();

    hw.gas = 900;
    hw.temperature_c = 40.0;
    hw.light = 50;
    hw.motion = true;
    tick(&mut controller, 1000, &mut hw, &mut store, &mut sink);
    tick(&mut controller, 2000, &mut hw, &mut store, &mut sink);

    assert!(hw.writes.is_empty());
    let ctx = controller.context();
    assert_eq!(ctx.sensors.gas, 900);
    assert!(!ctx.alarm_active());
    let record = sink.last_telemetry().unwrap();
    assert!(!record.system_enabled);
    assert!((record.temperature - 40.0).abs() < 1e-4);

    controller.run_once(2100, &mut hw, &mut store, &mut sink, Some("SYSTEM_ENABLE"));
    tick(&mut controller, 3000, &mut hw, &mut store, &mut sink);
    let ctx = controller.context();
    assert!(ctx.alarm_active());
    assert!(ctx.actuators.is_on(Output::Fan));
    assert!(ctx.actuators.is_on(Output::LivingRoom));
}

#[test]
fn disabling_the_system_ends_an_active_alert() {
    let mut hw = MockHardware::new();
    let mut store = MemStore::with_cells(&BASELINE_320);
    let (mut controller, mut sink) = boot(SystemConfig::default(), &mut hw, &mut store);

    hw.temperature_c = 40.0;
    tick(&mut controller, 1000, &mut hw, &mut store, &mut sink);
    assert!(controller.context().alert.active);

    controller.run_once(1100, &mut hw, &mut store, &mut sink, Some("SYSTEM_DISABLE"));
    assert!(!controller.context().alert.active);
    assert_eq!(hw.level(Output::LedA2), Some(false));
    assert_eq!(controller.context().actuators.display_override(), None);
}
