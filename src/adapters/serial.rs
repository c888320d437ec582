//! Serial link adapter.
//!
//! Outbound: [`SerialSink`] renders events as one JSON object per line,
//! the format the dashboard relay consumes.
//!
//! | Event              | Line                                              |
//! |--------------------|---------------------------------------------------|
//! | `Telemetry`        | the telemetry record                              |
//! | `CommandAccepted`  | `{"ack":"LIVING_ON"}`                             |
//! | `CommandRejected`  | `{"error":"unknown command","command":"FOO"}`     |
//! | others             | `{"event":"<name>", ...}`                          |
//!
//! Inbound: [`spawn_line_reader`] moves blocking reads onto a helper
//! thread and queues complete lines on a bounded [`LineChannel`].  The
//! control loop drains it without blocking; over-long lines and lines
//! arriving while the queue is full are dropped with a warning.

use std::io::{BufRead, ErrorKind, Write};
use std::thread::{self, JoinHandle};

use log::{debug, warn};
use serde_json::{Value, json};

use crate::adapters::channels::{Line, LineChannel, MAX_LINE};
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// JSON-lines event writer.
pub struct SerialSink<W: Write> {
    out: W,
}

impl<W: Write> SerialSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// JSON value for one event.
pub fn render(event: &AppEvent) -> Value {
    match event {
        AppEvent::Telemetry(record) => serde_json::to_value(record).unwrap_or(Value::Null),
        AppEvent::CommandAccepted(cmd) => json!({ "ack": cmd.as_str() }),
        AppEvent::CommandRejected(text) => json!({ "error": "unknown command", "command": text }),
        AppEvent::Started { gas_baseline } => {
            json!({ "event": "started", "gasBaseline": gas_baseline })
        }
        AppEvent::AlarmChanged(active) => json!({ "event": "alarm", "active": u8::from(*active) }),
        AppEvent::AlertChanged(active) => {
            json!({ "event": "tempAlert", "active": u8::from(*active) })
        }
        AppEvent::SystemErrorChanged(active) => {
            json!({ "event": "systemError", "active": u8::from(*active) })
        }
        AppEvent::Calibrated {
            baseline,
            alarm,
            safe,
        } => json!({
            "event": "calibrated",
            "gasBaseline": baseline,
            "gasAlarm": alarm,
            "gasSafe": safe,
        }),
        AppEvent::CalibrationFailed => json!({ "event": "calibrationFailed" }),
        AppEvent::StorageFailed(e) => json!({ "event": "storageFailed", "reason": e.to_string() }),
    }
}

impl<W: Write> EventSink for SerialSink<W> {
    fn emit(&mut self, event: &AppEvent) {
        let line = render(event);
        if line.is_null() {
            debug!("serial: nothing to render for {event:?}");
            return;
        }
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            warn!("serial: write failed: {e}");
        }
    }
}

/// What a reader did with its input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    pub forwarded: usize,
    /// Dropped because the channel was full.
    pub dropped_full: usize,
    /// Dropped because they exceeded [`MAX_LINE`] or were not UTF-8.
    pub dropped_invalid: usize,
}

/// Split `input` into lines and queue them on `channel` until end of
/// input.  Never blocks on the channel: a full queue drops the line.
///
/// At most [`MAX_LINE`] bytes of a line are held at once; the rest of an
/// over-long line is skipped up to its newline.
pub fn forward_lines<R: BufRead>(mut input: R, channel: &LineChannel) -> ReaderStats {
    let mut stats = ReaderStats::default();
    let mut pending: heapless::Vec<u8, MAX_LINE> = heapless::Vec::new();
    let mut overlong = false;

    loop {
        let chunk = match input.fill_buf() {
            Ok([]) => break,
            Ok(chunk) => chunk,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("serial: read failed: {e}");
                break;
            }
        };
        let used = chunk.len();
        for &byte in chunk {
            if byte == b'\n' {
                queue_line(&pending, overlong, channel, &mut stats);
                pending.clear();
                overlong = false;
            } else if pending.push(byte).is_err() {
                overlong = true;
            }
        }
        input.consume(used);
    }

    if !pending.is_empty() || overlong {
        queue_line(&pending, overlong, channel, &mut stats);
    }
    stats
}

fn queue_line(bytes: &[u8], overlong: bool, channel: &LineChannel, stats: &mut ReaderStats) {
    if overlong {
        warn!("serial: line longer than {MAX_LINE} bytes dropped");
        stats.dropped_invalid += 1;
        return;
    }
    let Ok(text) = core::str::from_utf8(bytes) else {
        warn!("serial: non-UTF-8 line dropped");
        stats.dropped_invalid += 1;
        return;
    };
    let text = text.trim_end_matches('\r');
    if text.trim().is_empty() {
        return;
    }

    let mut line = Line::new();
    // `text` is a prefix of a buffer of MAX_LINE bytes.
    let _ = line.push_str(text);
    if channel.try_send(line).is_ok() {
        stats.forwarded += 1;
    } else {
        warn!("serial: command queue full, dropping line");
        stats.dropped_full += 1;
    }
}

/// Run [`forward_lines`] on a helper thread.
pub fn spawn_line_reader<R>(input: R, channel: &'static LineChannel) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        let stats = forward_lines(input, channel);
        warn!(
            "serial: command input closed ({} forwarded, {} dropped)",
            stats.forwarded,
            stats.dropped_full + stats.dropped_invalid
        );
    })
}
