//! envnode controller library.
//!
//! Exposes the automation engine and its adapters for the firmware
//! binary and for integration testing. All ESP-IDF-specific code is
//! guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod acquisition;
pub mod actuators;
pub mod alert;
pub mod app;
pub mod automation;
pub mod calibration;
pub mod config;
pub mod error;
pub mod indicator;
pub mod persistence;
pub mod safety;
pub mod scheduler;
pub mod telemetry;

pub mod adapters;
pub mod drivers;
pub mod sensors;

mod pins;
