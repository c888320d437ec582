//! Outbound application events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: write a JSON line to the serial
//! link, render a log line, or record them in a test.

use crate::app::commands::Command;
use crate::error::StorageError;
use crate::telemetry::TelemetryRecord;

/// Structured events emitted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Boot finished; every output has been driven once.
    Started { gas_baseline: u16 },

    /// Periodic or `STATUS`-requested snapshot.
    Telemetry(TelemetryRecord),

    /// A command line was recognised and applied.
    CommandAccepted(Command),

    /// A non-empty line matched nothing in the vocabulary.  Carries the
    /// normalised text.
    CommandRejected(String),

    /// Gas alarm raised (`true`) or cleared.
    AlarmChanged(bool),

    /// Temperature alert entered (`true`) or left.
    AlertChanged(bool),

    /// `system_error` latched or released.
    SystemErrorChanged(bool),

    /// Gas calibration produced a new baseline.
    Calibrated { baseline: u16, alarm: u16, safe: u16 },

    /// Gas calibration found no usable samples; the old baseline stays.
    CalibrationFailed,

    /// Persisting settings failed; RAM state is unaffected.
    StorageFailed(StorageError),
}
