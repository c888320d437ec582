//! Inter-thread command channel.
//!
//! Uses an `embassy-sync` bounded channel to bridge the serial reader
//! thread with the synchronous control loop.  Both sides share one static
//! channel; every queued line is a fixed-capacity string, so a flood of
//! input costs at most `LINE_DEPTH * MAX_LINE` bytes.
//!
//! ```text
//! ┌──────────────┐   Line    ┌──────────────┐
//! │ Serial reader│──────────▶│ Control loop │
//! │  (thread)    │ try_send  │ try_receive  │
//! └──────────────┘           └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Longest accepted command line in bytes.  The longest vocabulary word
/// is 17 characters; the rest is room for padding and a stray `\r`.
pub const MAX_LINE: usize = 32;

/// Lines buffered between reader and loop.
pub const LINE_DEPTH: usize = 8;

/// One received command line, terminator stripped.
pub type Line = heapless::String<MAX_LINE>;

pub type LineChannel = Channel<CriticalSectionRawMutex, Line, LINE_DEPTH>;

/// Inbound command lines: serial reader → control loop.
pub static COMMAND_LINES: LineChannel = Channel::new();

/// Next pending command line, if any.
pub fn try_recv_line() -> Option<Line> {
    COMMAND_LINES.try_receive().ok()
}
