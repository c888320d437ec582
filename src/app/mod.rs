//! Application core: pure domain logic, zero I/O.
//!
//! The controller, its shared context, and the command/event vocabulary.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod context;
pub mod events;
pub mod ports;
pub mod service;
