//! Cooperative interval scheduler.
//!
//! The control loop has no threads and no timers of its own.  Each
//! iteration it asks the scheduler which periodic tasks are due and runs
//! them in a fixed order:
//!
//! ```text
//!   loop {
//!       now = clock.now_ms()
//!       ├─ Task::Sensors    (1000 ms)  acquisition
//!       ├─ rules            (every iteration)  automation → security → alert
//!       ├─ alert blink      (500 ms, self-timed while alerting)
//!       ├─ status indicator (every iteration)
//!       ├─ Task::Telemetry  (2000 ms)
//!       └─ at most one command line
//!   }
//! ```
//!
//! A timer fires when at least `interval` milliseconds have elapsed since
//! it last fired.  Late iterations do not accumulate a backlog: a timer
//! fires at most once per poll and restarts from the poll time.

use crate::config::SystemConfig;

/// Periodic tasks driven by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Sensors,
    Telemetry,
}

/// Maximum number of tasks that can be due in one poll.
pub const MAX_DUE: usize = 2;

/// One "every N ms" timer.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    interval_ms: u64,
    last_ms: u64,
}

impl IntervalTimer {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: u64::from(interval_ms),
            last_ms: 0,
        }
    }

    /// True (and re-armed) if the interval has elapsed at `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_ms) >= self.interval_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }

    pub fn last_fired_ms(&self) -> u64 {
        self.last_ms
    }
}

/// Fixed-order scheduler for the controller's periodic tasks.
pub struct Scheduler {
    sensors: IntervalTimer,
    telemetry: IntervalTimer,
}

impl Scheduler {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            sensors: IntervalTimer::new(config.sensor_interval_ms),
            telemetry: IntervalTimer::new(config.telemetry_interval_ms),
        }
    }

    /// Tasks due at `now_ms`, in execution order.
    pub fn poll(&mut self, now_ms: u64) -> heapless::Vec<Task, MAX_DUE> {
        let mut due = heapless::Vec::new();
        if self.sensors.poll(now_ms) {
            let _ = due.push(Task::Sensors);
        }
        if self.telemetry.poll(now_ms) {
            let _ = due.push(Task::Telemetry);
        }
        due
    }
}
