//! Mock hardware adapter for integration tests.
//!
//! Plays back scripted input levels and records every drive, LED and
//! timebase call so tests can assert on the full history without touching
//! real GPIO/PWM registers.

use pickplaz::app::events::AppEvent;
use pickplaz::app::ports::{DrivePort, EventSink, InputPort, RawInputs, TimebasePort};
use pickplaz::app::service::FeederApp;
use pickplaz::config::FeederConfig;
use pickplaz::control::commutation::PwmChannelSet;
use pickplaz::drivers::led_indicator::LedFrame;
use pickplaz::error::TimebaseError;

// ── Timebase call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimebaseCall {
    Start(u32),
    Stop,
}

// ── MockHardware ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockHardware {
    /// Levels returned by the next `sample()`.
    pub inputs: RawInputs,
    pub drive_writes: Vec<Vec<u16>>,
    pub led_writes: Vec<LedFrame>,
    pub timebase_calls: Vec<TimebaseCall>,
    /// Make `start_tick` fail.
    pub refuse_timebase: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_drive(&self) -> Option<&[u16]> {
        self.drive_writes.last().map(Vec::as_slice)
    }

    pub fn max_drive_duty(&self) -> u16 {
        self.drive_writes.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn max_led_duty(&self) -> u16 {
        self.led_writes.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn starts(&self) -> usize {
        self.timebase_calls
            .iter()
            .filter(|c| matches!(c, TimebaseCall::Start(_)))
            .count()
    }
}

impl InputPort for MockHardware {
    fn sample(&mut self) -> RawInputs {
        self.inputs
    }
}

impl DrivePort for MockHardware {
    fn write_drive(&mut self, channels: &PwmChannelSet) {
        self.drive_writes.push(channels.as_slice().to_vec());
    }

    fn write_leds(&mut self, frame: &LedFrame) {
        self.led_writes.push(*frame);
    }
}

impl TimebasePort for MockHardware {
    fn start_tick(&mut self, hz: u32) -> Result<(), TimebaseError> {
        if self.refuse_timebase {
            return Err(TimebaseError::Unsupported);
        }
        self.timebase_calls.push(TimebaseCall::Start(hz));
        Ok(())
    }

    fn stop_tick(&mut self) {
        self.timebase_calls.push(TimebaseCall::Stop);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Rig: app + mocks ──────────────────────────────────────────

/// A started feeder on mock hardware, past the button warm-up.
pub struct Rig {
    pub app: FeederApp,
    pub hw: MockHardware,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_config(FeederConfig::default())
    }

    pub fn with_config(config: FeederConfig) -> Self {
        let warmup = u32::from(config.app.debounce_ticks);
        let mut rig = Self {
            app: FeederApp::new(config).expect("valid config"),
            hw: MockHardware::new(),
            sink: RecordingSink::new(),
        };
        rig.app
            .start(&mut rig.hw, &mut rig.sink)
            .expect("mock timebase starts");
        rig.ticks(warmup + 5);
        rig
    }

    pub fn tick(&mut self) {
        self.app.tick(&mut self.hw, &mut self.sink);
    }

    pub fn ticks(&mut self, n: u32) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Hold the feed button for `n` ticks, then release it.
    pub fn press_feed(&mut self, n: u32) {
        self.hw.inputs.feed = true;
        self.ticks(n);
        self.hw.inputs.feed = false;
    }

    /// Hold the reverse button for `n` ticks, then release it.
    pub fn press_reverse(&mut self, n: u32) {
        self.hw.inputs.reverse = true;
        self.ticks(n);
        self.hw.inputs.reverse = false;
    }

    /// Tick until `done` holds or `limit` ticks pass. Returns whether it held.
    pub fn run_until(&mut self, limit: u32, done: impl Fn(&FeederApp) -> bool) -> bool {
        for _ in 0..limit {
            if done(&self.app) {
                return true;
            }
            self.tick();
        }
        done(&self.app)
    }
}
