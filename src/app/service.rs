//! Application service: the hexagonal core.
//!
//! [`FeederApp`] owns both button classifiers, the motion and motor state
//! machines and the LED indicator. It exposes the three lifecycle entry
//! points plus the per-tick pipeline. All I/O flows through port traits
//! injected at call sites, making the whole service testable with mock
//! adapters.
//!
//! ```text
//!   InputPort ──▶ ┌──────────────────────────────────┐ ──▶ EventSink
//!                 │            FeederApp             │
//! TimebasePort ◀──│ Buttons · Feed · Motion · Motor  │
//!    DrivePort ◀──│           · LEDs                 │
//!                 └──────────────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::{Direction, FeederConfig};
use crate::control::commutation::PwmChannelSet;
use crate::drivers::button::{ButtonClassifier, PressThresholds};
use crate::drivers::led_indicator::{LED_COUNT, LedIndicator, PatternId};
use crate::error::Result;
use crate::fsm::messages::{MotorEvent, MotorStatus};
use crate::fsm::motion::context::{MotionContext, MoveOutcome, MoveProfile};
use crate::fsm::motion::{AppState, MotionFsm, new_motion_fsm};
use crate::fsm::motor::context::MotorContext;
use crate::fsm::motor::{MotorFsm, MotorState, new_motor_fsm};

use super::events::{AppEvent, Telemetry};
use super::feed::{self, FeedRequest};
use super::ports::{DrivePort, EventSink, InputPort, TimebasePort};

// ───────────────────────────────────────────────────────────────
// Lifecycle and counters
// ───────────────────────────────────────────────────────────────

/// Whether ticks are being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Ticks are ignored.
    Stopped,
    /// Normal tick processing.
    Running,
    /// `stop()` was called; ticking until both machines are idle.
    Halting,
}

/// Running totals since construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Ticks processed (ignored ticks are not counted).
    pub ticks: u64,
    pub moves_completed: u32,
    pub moves_aborted: u32,
    /// Motor fault reports.
    pub faults: u32,
    /// Feed requests dropped by the motion FSM.
    pub ignored_requests: u32,
    /// Commands dropped by the motor FSM.
    pub rejected_commands: u32,
    /// Timer ticks skipped because the loop fell behind.
    pub tick_overruns: u32,
}

// ───────────────────────────────────────────────────────────────
// FeederApp
// ───────────────────────────────────────────────────────────────

/// The feeder motion core.
pub struct FeederApp {
    config: FeederConfig,
    feed_button: ButtonClassifier,
    reverse_button: ButtonClassifier,
    motion: MotionFsm,
    motion_ctx: MotionContext,
    motor: MotorFsm,
    motor_ctx: MotorContext,
    leds: LedIndicator,
    lifecycle: Lifecycle,
    last_request: FeedRequest,
    stats: Stats,
}

impl FeederApp {
    /// Validate `config` and build every stage in `Init`.
    ///
    /// Tick processing does not begin until [`start`](Self::start).
    pub fn new(config: FeederConfig) -> Result<Self> {
        config.validate()?;

        let thresholds = PressThresholds::from(&config.app);
        let mut motion_ctx = MotionContext::new(MoveProfile::from(&config));
        let mut motor_ctx = MotorContext::new(config.motor.clone());
        let mut motion = new_motion_fsm();
        let mut motor = new_motor_fsm();
        motion.start(&mut motion_ctx);
        motor.start(&mut motor_ctx);

        Ok(Self {
            feed_button: ButtonClassifier::new(thresholds),
            reverse_button: ButtonClassifier::new(thresholds),
            motion,
            motion_ctx,
            motor,
            motor_ctx,
            leds: LedIndicator::new(config.indicator.clone()),
            lifecycle: Lifecycle::Stopped,
            last_request: FeedRequest::NONE,
            stats: Stats::default(),
            config,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Begin tick processing. A no-op while already running; cancels a
    /// pending halt.
    pub fn start(&mut self, timebase: &mut impl TimebasePort, sink: &mut impl EventSink) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Running => return Ok(()),
            Lifecycle::Halting => {
                info!("FeederApp: halt cancelled");
                self.lifecycle = Lifecycle::Running;
                return Ok(());
            }
            Lifecycle::Stopped => {}
        }

        let hz = self.config.app.tick_hz;
        timebase.start_tick(hz)?;

        // A restart re-runs the warm-up so a button held across stop/start
        // does not fire immediately.
        self.feed_button.reset();
        self.reverse_button.reset();
        self.last_request = FeedRequest::NONE;
        self.lifecycle = Lifecycle::Running;

        sink.emit(&AppEvent::Started { tick_hz: hz });
        info!("FeederApp started at {}Hz in {:?}", hz, self.motion.current_state());
        Ok(())
    }

    /// Request brake-and-halt. Takes effect over the following ticks.
    pub fn stop(&mut self, sink: &mut impl EventSink) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        self.lifecycle = Lifecycle::Halting;
        info!(
            "FeederApp halting (motion={:?} motor={:?})",
            self.motion.current_state(),
            self.motor.current_state()
        );
        sink.emit(&AppEvent::HaltRequested);
    }

    // ── Per-tick pipeline ─────────────────────────────────────

    /// Run one tick: sample → classify → map → motion → motor → drive → LEDs.
    ///
    /// The `hw` parameter satisfies every hardware port at once, which
    /// avoids a double mutable borrow while keeping the port boundary
    /// explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl InputPort + DrivePort + TimebasePort),
        sink: &mut impl EventSink,
    ) {
        if self.lifecycle == Lifecycle::Stopped {
            return;
        }
        self.stats.ticks += 1;
        let halting = self.lifecycle == Lifecycle::Halting;

        // 1. Sample; buttons read as released while halting.
        let raw = hw.sample();
        let (feed_level, reverse_level) = if halting {
            (false, false)
        } else {
            (raw.feed, raw.reverse)
        };

        // 2. Classify and map.
        let feed_event = self.feed_button.update(feed_level);
        let reverse_event = self.reverse_button.update(reverse_level);
        let request = feed::resolve(feed_event, reverse_event);

        // 3. Motion FSM, fed last tick's motor status.
        let prev_app = self.motion.current_state();
        let prev_motor = self.motor.current_state();
        let status = MotorStatus {
            state: prev_motor,
            event: self.motor_ctx.event,
        };
        self.motion_ctx.begin_tick(request, status, raw.fault);
        self.motion_ctx.halt_requested = halting;
        self.motion.tick(&mut self.motion_ctx);

        // 4. Motor FSM.
        let command = self.motion_ctx.command.take();
        self.motor_ctx.begin_tick(command, raw.fault);
        self.motor.tick(&mut self.motor_ctx);

        // 5. Drive.
        hw.write_drive(self.motor_ctx.channels());

        // 6. LEDs.
        let app_state = self.motion.current_state();
        self.leds.set_motion_pattern(motion_pattern(app_state));
        self.leds.set_fault(raw.fault);
        if !request.is_none() {
            self.leds.pulse_feed();
        }
        let frame = self.leds.tick();
        hw.write_leds(&frame);

        // 7. Events.
        self.report(request, prev_app, prev_motor, sink);

        if halting
            && app_state == AppState::Idle
            && self.motor.current_state() == MotorState::Idle
        {
            self.finish_halt(hw, sink);
        }
    }

    /// Account for timer ticks the caller had to skip.
    pub fn record_missed_ticks(&mut self, missed: u32) {
        if missed > 0 {
            warn!("FeederApp: {} tick(s) overrun", missed);
            self.stats.tick_overruns = self.stats.tick_overruns.saturating_add(missed);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn app_state(&self) -> AppState {
        self.motion.current_state()
    }

    pub fn motor_state(&self) -> MotorState {
        self.motor.current_state()
    }

    /// Duties written to the drive port on the last tick.
    pub fn channels(&self) -> &PwmChannelSet {
        self.motor_ctx.channels()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn stats(&self) -> Stats {
        Stats {
            ignored_requests: self.motion_ctx.ignored_requests,
            rejected_commands: self.motor_ctx.rejected_commands,
            ..self.stats
        }
    }

    pub fn config(&self) -> &FeederConfig {
        &self.config
    }

    /// Build a telemetry snapshot from the current counters.
    pub fn telemetry(&self) -> Telemetry {
        let stats = self.stats();
        Telemetry {
            ticks: stats.ticks,
            app_state: self.app_state(),
            motor_state: self.motor_state(),
            moves_completed: stats.moves_completed,
            moves_aborted: stats.moves_aborted,
            faults: stats.faults,
            ignored_requests: stats.ignored_requests,
            rejected_commands: stats.rejected_commands,
            tick_overruns: stats.tick_overruns,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn report(
        &mut self,
        request: FeedRequest,
        prev_app: AppState,
        prev_motor: MotorState,
        sink: &mut impl EventSink,
    ) {
        // Held buttons repeat `Long` every tick; report changes only.
        if request != self.last_request && !request.is_none() {
            sink.emit(&AppEvent::FeedSignal {
                signal: request.signal,
                source: request.source,
            });
        }
        self.last_request = request;

        let app_state = self.motion.current_state();
        if app_state != prev_app {
            sink.emit(&AppEvent::AppStateChanged {
                from: prev_app,
                to: app_state,
            });
        }
        let motor_state = self.motor.current_state();
        if motor_state != prev_motor {
            sink.emit(&AppEvent::MotorStateChanged {
                from: prev_motor,
                to: motor_state,
            });
        }

        if self.motor_ctx.event == Some(MotorEvent::Fault) {
            self.stats.faults = self.stats.faults.saturating_add(1);
        }

        if let Some(outcome) = self.motion_ctx.outcome {
            match outcome {
                MoveOutcome::Completed => {
                    self.stats.moves_completed = self.stats.moves_completed.saturating_add(1);
                }
                MoveOutcome::Aborted(reason) => {
                    self.stats.moves_aborted = self.stats.moves_aborted.saturating_add(1);
                    warn!("FeederApp: move aborted ({:?})", reason);
                }
            }
            sink.emit(&AppEvent::MoveFinished(outcome));
        }

        let interval = u64::from(self.config.app.heartbeat_interval_ticks);
        if interval != 0 && self.stats.ticks % interval == 0 {
            sink.emit(&AppEvent::Heartbeat(self.telemetry()));
        }
    }

    fn finish_halt(&mut self, hw: &mut (impl DrivePort + TimebasePort), sink: &mut impl EventSink) {
        hw.stop_tick();
        self.leds.clear_all();
        hw.write_leds(&[0; LED_COUNT]);
        self.lifecycle = Lifecycle::Stopped;
        sink.emit(&AppEvent::Halted);
        info!("FeederApp halted after {} ticks", self.stats.ticks);
    }
}

/// LED motion pattern shown for an application state.
fn motion_pattern(state: AppState) -> PatternId {
    match state.direction() {
        Some(Direction::Forward) => PatternId::ChaseForward,
        Some(Direction::Backward) => PatternId::ChaseBackward,
        None if state == AppState::Init => PatternId::Standby,
        None => PatternId::Breathing,
    }
}
