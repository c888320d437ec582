//! Settings persistence across simulated power cycles.

use envnode::actuators::Output;
use envnode::app::events::AppEvent;
use envnode::app::service::Controller;
use envnode::config::SystemConfig;
use envnode::error::StorageError;

use crate::mock_hw::{MemStore, MockHardware, RecordingSink};

fn power_on(store: &mut MemStore, hw: &mut MockHardware) -> (Controller, RecordingSink) {
    let mut controller = Controller::new(SystemConfig::default());
    let mut sink = RecordingSink::new();
    controller.start(hw, store, &mut sink);
    (controller, sink)
}

#[test]
fn settings_survive_a_power_cycle() {
    let mut store = MemStore::erased();
    let mut hw = MockHardware::new();
    hw.gas = 212;
    let (mut controller, mut sink) = power_on(&mut store, &mut hw);
    for line in ["LED_A3_ON", "LED_A5_ON", "AUTO_TEMP_TOGGLE", "KITCHEN_ON"] {
        controller.handle_line(line, 10, &mut hw, &mut store, &mut sink);
    }
    drop(controller);

    let mut hw = MockHardware::new();
    let (controller, _) = power_on(&mut store, &mut hw);
    let ctx = controller.context();

    assert_eq!(hw.gas_reads, 0, "baseline restored, no calibration");
    assert_eq!(ctx.gas_baseline, 212);
    assert!(ctx.modes.auto_light);
    assert!(!ctx.modes.auto_temp);
    assert!(ctx.actuators.is_on(Output::LedA3));
    assert!(ctx.actuators.is_on(Output::LedA5));
    assert!(!ctx.actuators.is_on(Output::LedA2));
    assert!(!ctx.actuators.is_on(Output::Kitchen), "room lights start off");
    assert_eq!(hw.level(Output::LedA5), Some(true));
}

#[test]
fn baseline_is_stored_at_four_count_resolution() {
    let mut store = MemStore::erased();
    let mut hw = MockHardware::new();
    hw.gas = 203;
    power_on(&mut store, &mut hw);
    assert_eq!(store.cells[2], 50);

    let mut hw = MockHardware::new();
    let (controller, _) = power_on(&mut store, &mut hw);
    assert_eq!(controller.context().gas_baseline, 200);
}

#[test]
fn invalid_flag_bytes_fall_back_to_defaults() {
    let mut store = MemStore::with_cells(&[7, 0, 80, 0x42, 1, 0xFF, 0]);
    let mut hw = MockHardware::new();
    let (controller, _) = power_on(&mut store, &mut hw);
    let ctx = controller.context();

    assert!(ctx.modes.auto_light);
    assert!(!ctx.modes.auto_temp);
    assert!(!ctx.actuators.is_on(Output::LedA2));
    assert!(ctx.actuators.is_on(Output::LedA3));
    assert!(!ctx.actuators.is_on(Output::LedA4));
}

#[test]
fn unchanged_settings_are_not_rewritten() {
    let mut store = MemStore::erased();
    let mut hw = MockHardware::new();
    let (mut controller, mut sink) = power_on(&mut store, &mut hw);
    assert_eq!(store.writes, 7);

    controller.handle_line("LED_A2_OFF", 10, &mut hw, &mut store, &mut sink);
    controller.handle_line("ALL_LEDS_OFF", 20, &mut hw, &mut store, &mut sink);
    assert_eq!(store.writes, 7);

    controller.handle_line("LED_A2_ON", 30, &mut hw, &mut store, &mut sink);
    assert_eq!(store.writes, 8);
}

#[test]
fn unreadable_store_boots_with_factory_settings() {
    let mut store = MemStore::erased();
    store.broken = true;
    let mut hw = MockHardware::new();
    let (controller, sink) = power_on(&mut store, &mut hw);

    let ctx = controller.context();
    assert!(ctx.modes.auto_light && ctx.modes.auto_temp);
    assert_eq!(ctx.gas_baseline, 180, "calibrated because no baseline was found");
    assert!(sink.events.contains(&AppEvent::StorageFailed(StorageError::Io)));
    assert!(matches!(sink.events.last(), Some(AppEvent::Started { .. })));
}
