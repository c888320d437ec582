//! Controller: the hexagonal core.
//!
//! [`Controller`] owns the scheduler and the shared context.  It exposes
//! a hardware-agnostic API; all I/O flows through port traits injected at
//! call sites, so the whole engine is testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                  │          Controller           │
//!   OutputPort ◀── │ acquisition · automation ·    │ ◀─▶ ByteStore
//!                  │ safety · alert · indicator    │
//!                  └──────────────────────────────┘
//! ```

use log::{info, warn};

use crate::actuators::Output;
use crate::app::context::ControllerContext;
use crate::config::SystemConfig;
use crate::indicator::IndicatorMode;
use crate::persistence::{self, PersistentSettings};
use crate::scheduler::{Scheduler, Task};
use crate::{acquisition, alert, automation, calibration, safety, telemetry};

use super::commands::{Command, CommandError};
use super::events::AppEvent;
use super::ports::{ByteStore, EventSink, Hardware, OutputPort};

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

/// The controller orchestrates every rule component.
pub struct Controller {
    ctx: ControllerContext,
    scheduler: Scheduler,
}

impl Controller {
    /// Construct the controller from configuration.
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let scheduler = Scheduler::new(&config);
        Self {
            ctx: ControllerContext::new(config),
            scheduler,
        }
    }

    /// Read-only view of the controller state.
    pub fn context(&self) -> &ControllerContext {
        &self.ctx
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Boot sequence: restore settings, establish a gas baseline, drive
    /// every output to its logical level once.
    pub fn start(
        &mut self,
        hw: &mut impl Hardware,
        store: &mut impl ByteStore,
        sink: &mut impl EventSink,
    ) {
        let defaults = PersistentSettings::factory(&self.ctx.config);
        let (settings, stored) = persistence::load(store, defaults);
        self.ctx.apply_settings(&settings);

        if stored.gas_baseline.is_some() {
            info!(
                "gas baseline {} restored (alarm {}, safe {})",
                self.ctx.gas_baseline, self.ctx.thresholds.gas_alarm, self.ctx.thresholds.gas_safe
            );
        } else if self.calibrate(hw, sink) {
            self.persist(store, sink);
        }

        self.ctx.actuators.sync_all(hw);
        info!(
            "controller started: auto_light={} auto_temp={}",
            self.ctx.modes.auto_light, self.ctx.modes.auto_temp
        );
        sink.emit(&AppEvent::Started {
            gas_baseline: self.ctx.gas_baseline,
        });
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// One pass of the cooperative loop.
    ///
    /// Order: acquisition (sensor tick only) → automation, security and
    /// temperature alert on the latest snapshot → alert blink → status
    /// indicator → telemetry → `line`, if any.  The rules run every pass so
    /// timeouts fire on time between readings; the command runs last, so
    /// its writes win for this iteration.
    pub fn run_once(
        &mut self,
        now_ms: u64,
        hw: &mut impl Hardware,
        store: &mut impl ByteStore,
        sink: &mut impl EventSink,
        line: Option<&str>,
    ) {
        let due = self.scheduler.poll(now_ms);

        if due.contains(&Task::Sensors) && acquisition::step(&mut self.ctx, hw) {
            sink.emit(&AppEvent::SystemErrorChanged(true));
        }
        if self.ctx.modes.system_enabled {
            self.apply_rules(now_ms, hw, sink);
        }

        alert::blink(&mut self.ctx, now_ms, hw);

        let mode = IndicatorMode::select(&self.ctx.errors, self.ctx.alarm_active());
        self.ctx.indicator.tick(mode, &self.ctx.config, now_ms, hw);

        if due.contains(&Task::Telemetry) {
            self.report(now_ms, sink);
        }

        if let Some(line) = line {
            self.handle_line(line, now_ms, hw, store, sink);
        }
    }

    fn apply_rules(&mut self, now_ms: u64, hw: &mut impl Hardware, sink: &mut impl EventSink) {
        automation::step(&mut self.ctx, now_ms, hw);

        if let Some(raised) = safety::evaluate(&mut self.ctx, hw).level() {
            sink.emit(&AppEvent::AlarmChanged(raised));
        }

        if let Some(active) = alert::evaluate(&mut self.ctx, now_ms, hw) {
            sink.emit(&AppEvent::AlertChanged(active));
        }
    }

    fn report(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        let (record, released) = telemetry::report(&mut self.ctx, now_ms);
        sink.emit(&AppEvent::Telemetry(record));
        if released {
            info!("sensors healthy again, system error released");
            sink.emit(&AppEvent::SystemErrorChanged(false));
        }
    }

    // ── Commands ──────────────────────────────────────────────

    /// Parse and apply one input line.  Blank lines are ignored; unknown
    /// text is reported once and changes nothing.
    pub fn handle_line(
        &mut self,
        line: &str,
        now_ms: u64,
        hw: &mut impl Hardware,
        store: &mut impl ByteStore,
        sink: &mut impl EventSink,
    ) {
        match Command::parse(line) {
            Ok(Some(cmd)) => self.execute(cmd, now_ms, hw, store, sink),
            Ok(None) => {}
            Err(CommandError::Unknown(text)) => {
                sink.emit(&AppEvent::CommandRejected(text));
            }
        }
    }

    /// Apply a command: logical change, physical write, then persistence
    /// of any persisted field it touched.
    pub fn execute(
        &mut self,
        cmd: Command,
        now_ms: u64,
        hw: &mut impl Hardware,
        store: &mut impl ByteStore,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            Command::SetOutput(output, on) => {
                self.ctx.actuators.set(output, on, hw);
            }
            Command::TempAlert(enabled) => {
                self.ctx.alert.enabled = enabled;
                if !enabled && alert::force_normal(&mut self.ctx, hw) {
                    sink.emit(&AppEvent::AlertChanged(false));
                }
            }
            Command::AlarmOff => {
                if safety::force_clear(&mut self.ctx, hw).changed() {
                    sink.emit(&AppEvent::AlarmChanged(false));
                }
            }
            Command::ToggleAutoLight => {
                self.ctx.modes.auto_light = !self.ctx.modes.auto_light;
                info!("auto light {}", on_off(self.ctx.modes.auto_light));
            }
            Command::ToggleAutoTemp => {
                self.ctx.modes.auto_temp = !self.ctx.modes.auto_temp;
                info!("auto temp {}", on_off(self.ctx.modes.auto_temp));
            }
            Command::System(enabled) => {
                self.ctx.modes.system_enabled = enabled;
                info!("automatic rules {}", if enabled { "resumed" } else { "suspended" });
                if !enabled && alert::force_normal(&mut self.ctx, hw) {
                    sink.emit(&AppEvent::AlertChanged(false));
                }
            }
            Command::CalibrateGas => {
                self.calibrate(hw, sink);
            }
            Command::ResetErrors => {
                let was_latched = self.ctx.errors.system_error;
                self.ctx.errors.reset();
                if was_latched {
                    sink.emit(&AppEvent::SystemErrorChanged(false));
                }
            }
            Command::AllLightsOff => {
                self.switch_off(&Output::ROOM_LIGHTS, hw);
            }
            Command::AllLedsOff => {
                self.switch_off(&Output::AUX_LEDS, hw);
            }
            Command::AllOff => {
                let mut group: heapless::Vec<Output, { Output::COUNT }> = heapless::Vec::new();
                let _ = group.extend_from_slice(&Output::ROOM_LIGHTS);
                let _ = group.extend_from_slice(&Output::AUX_LEDS);
                let _ = group.extend_from_slice(&[Output::Fan, Output::Ac]);
                self.switch_off(&group, hw);
            }
            Command::Status => {
                self.report(now_ms, sink);
            }
        }

        sink.emit(&AppEvent::CommandAccepted(cmd));

        if cmd.touches_persisted() {
            self.persist(store, sink);
        }
    }

    fn switch_off(&mut self, outputs: &[Output], hw: &mut impl OutputPort) {
        let mut targets: heapless::Vec<(Output, bool), { Output::COUNT }> = heapless::Vec::new();
        for &output in outputs {
            let _ = targets.push((output, false));
        }
        let changed = self.ctx.actuators.apply_group(&targets, hw);
        info!("{changed} output(s) switched off");
    }

    // ── Calibration & persistence ─────────────────────────────

    /// Run a blocking gas calibration.  Returns `true` on success; on
    /// failure the previous baseline stays in force.
    fn calibrate(&mut self, hw: &mut impl Hardware, sink: &mut impl EventSink) -> bool {
        match calibration::calibrate(hw, &self.ctx.config) {
            Ok(baseline) => {
                self.ctx.gas_baseline = baseline;
                self.ctx.thresholds.apply_gas_baseline(&self.ctx.config, baseline);
                let (alarm, safe) = (self.ctx.thresholds.gas_alarm, self.ctx.thresholds.gas_safe);
                info!("gas baseline {baseline}: alarm above {alarm}, safe below {safe}");
                sink.emit(&AppEvent::Calibrated {
                    baseline,
                    alarm,
                    safe,
                });
                true
            }
            Err(e) => {
                warn!("gas calibration failed ({e}), keeping baseline {}", self.ctx.gas_baseline);
                sink.emit(&AppEvent::CalibrationFailed);
                false
            }
        }
    }

    fn persist(&self, store: &mut impl ByteStore, sink: &mut impl EventSink) {
        if let Err(e) = persistence::save(store, &self.ctx.persistent_settings()) {
            warn!("settings not saved: {e}");
            sink.emit(&AppEvent::StorageFailed(e));
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
