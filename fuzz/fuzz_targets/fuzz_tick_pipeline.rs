//! Fuzz target: `FeederApp::tick`
//!
//! Each input byte is one tick of raw levels: bit 0 feed, bit 1 reverse,
//! bit 2 fault, bit 3 requests a stop, bit 4 a (re)start. The run is then
//! drained with every line released.
//!
//! Invariants checked:
//! - No panics under any input sequence
//! - Drive and LED duties never exceed their configured maximum
//! - The motor FSM never rejects a command from the motion FSM
//! - Once drained, both machines are idle and every phase is off
//!
//! cargo fuzz run fuzz_tick_pipeline

#![no_main]

use libfuzzer_sys::fuzz_target;
use pickplaz::app::events::AppEvent;
use pickplaz::app::ports::{DrivePort, EventSink, InputPort, RawInputs, TimebasePort};
use pickplaz::app::service::{FeederApp, Lifecycle};
use pickplaz::config::FeederConfig;
use pickplaz::control::commutation::PwmChannelSet;
use pickplaz::drivers::led_indicator::LedFrame;
use pickplaz::error::TimebaseError;
use pickplaz::fsm::motion::AppState;
use pickplaz::fsm::motor::MotorState;

struct Bench {
    inputs: RawInputs,
    max_drive: u16,
    max_led: u16,
}

impl InputPort for Bench {
    fn sample(&mut self) -> RawInputs {
        self.inputs
    }
}

impl DrivePort for Bench {
    fn write_drive(&mut self, channels: &PwmChannelSet) {
        for &d in channels.as_slice() {
            self.max_drive = self.max_drive.max(d);
        }
    }

    fn write_leds(&mut self, frame: &LedFrame) {
        for &d in frame {
            self.max_led = self.max_led.max(d);
        }
    }
}

impl TimebasePort for Bench {
    fn start_tick(&mut self, _hz: u32) -> Result<(), TimebaseError> {
        Ok(())
    }
    fn stop_tick(&mut self) {}
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

/// Long enough for any move plus its brake to finish.
const DRAIN_TICKS: usize = 3_000;

fuzz_target!(|data: &[u8]| {
    let config = FeederConfig::default();
    let Ok(mut app) = FeederApp::new(config.clone()) else {
        return;
    };
    let mut bench = Bench {
        inputs: RawInputs::default(),
        max_drive: 0,
        max_led: 0,
    };
    if app.start(&mut bench, &mut Discard).is_err() {
        return;
    }

    // Each byte is repeated so presses can reach the long threshold.
    for &byte in data {
        bench.inputs = RawInputs {
            feed: byte & 0x01 != 0,
            reverse: byte & 0x02 != 0,
            fault: byte & 0x04 != 0,
        };
        if byte & 0x08 != 0 {
            app.stop(&mut Discard);
        }
        if byte & 0x10 != 0 {
            let _ = app.start(&mut bench, &mut Discard);
        }
        let repeat = usize::from(byte >> 5) * 40 + 1;
        for _ in 0..repeat {
            app.tick(&mut bench, &mut Discard);
        }
    }

    bench.inputs = RawInputs::default();
    if app.lifecycle() == Lifecycle::Stopped {
        let _ = app.start(&mut bench, &mut Discard);
    }
    for _ in 0..DRAIN_TICKS {
        app.tick(&mut bench, &mut Discard);
    }

    assert!(bench.max_drive <= config.motor.max_duty);
    assert!(bench.max_led <= config.indicator.max_duty);
    assert_eq!(app.stats().rejected_commands, 0);
    assert_eq!(app.app_state(), AppState::Idle);
    assert_eq!(app.motor_state(), MotorState::Idle);
    assert!(app.channels().is_zero());
});
