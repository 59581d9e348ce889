//! Lifecycle tests: init, start, stop/halt, restart and heartbeat.

use crate::mock_hw::{MockHardware, RecordingSink, Rig, TimebaseCall};

use pickplaz::app::events::AppEvent;
use pickplaz::app::service::{FeederApp, Lifecycle};
use pickplaz::config::FeederConfig;
use pickplaz::error::{Error, TimebaseError};
use pickplaz::fsm::motion::AppState;
use pickplaz::fsm::motion::context::{AbortReason, MoveOutcome};
use pickplaz::fsm::motor::MotorState;

fn heartbeats(sink: &RecordingSink) -> usize {
    sink.count(|e| matches!(e, AppEvent::Heartbeat(_)))
}

// ── Init / start ──────────────────────────────────────────────

#[test]
fn invalid_config_fails_init() {
    let mut config = FeederConfig::default();
    config.app.short_press_ticks = config.app.long_press_ticks;
    assert!(matches!(FeederApp::new(config), Err(Error::Config(_))));
}

#[test]
fn first_tick_leaves_init() {
    let mut app = FeederApp::new(FeederConfig::default()).expect("defaults are valid");
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    app.start(&mut hw, &mut sink).expect("mock timebase starts");
    assert_eq!(hw.timebase_calls, vec![TimebaseCall::Start(1000)]);
    assert_eq!(app.app_state(), AppState::Init);

    app.tick(&mut hw, &mut sink);
    assert!(sink.contains(&AppEvent::AppStateChanged {
        from: AppState::Init,
        to: AppState::Idle,
    }));
    assert!(sink.contains(&AppEvent::MotorStateChanged {
        from: MotorState::Init,
        to: MotorState::Idle,
    }));
    assert_eq!(hw.last_drive(), Some(&[0u16, 0][..]));
}

#[test]
fn start_twice_registers_once() {
    let mut rig = Rig::new();
    rig.app
        .start(&mut rig.hw, &mut rig.sink)
        .expect("second start is a no-op");
    assert_eq!(rig.hw.starts(), 1);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Started { .. })), 1);
}

#[test]
fn refused_timebase_leaves_app_stopped() {
    let mut app = FeederApp::new(FeederConfig::default()).expect("defaults are valid");
    let mut hw = MockHardware {
        refuse_timebase: true,
        ..MockHardware::default()
    };
    let mut sink = RecordingSink::new();

    let err = app.start(&mut hw, &mut sink);
    assert_eq!(err, Err(Error::Timebase(TimebaseError::Unsupported)));
    assert_eq!(app.lifecycle(), Lifecycle::Stopped);

    app.tick(&mut hw, &mut sink);
    assert_eq!(app.stats().ticks, 0);
    assert!(hw.drive_writes.is_empty());
}

// ── Stop / halt ───────────────────────────────────────────────

#[test]
fn stop_before_start_is_noop() {
    let mut app = FeederApp::new(FeederConfig::default()).expect("defaults are valid");
    let mut sink = RecordingSink::new();
    app.stop(&mut sink);
    assert_eq!(app.lifecycle(), Lifecycle::Stopped);
    assert!(sink.events.is_empty());
}

#[test]
fn stop_while_idle_halts_on_next_tick() {
    let mut rig = Rig::new();
    rig.app.stop(&mut rig.sink);
    assert_eq!(rig.app.lifecycle(), Lifecycle::Halting);

    rig.tick();
    assert_eq!(rig.app.lifecycle(), Lifecycle::Stopped);
    assert_eq!(rig.hw.timebase_calls.last(), Some(&TimebaseCall::Stop));
    assert!(rig.sink.contains(&AppEvent::Halted));
    assert_eq!(rig.hw.led_writes.last(), Some(&[0; 4]));
}

#[test]
fn stop_mid_move_brakes_then_halts() {
    let mut rig = Rig::new();
    rig.hw.inputs.feed = true;
    assert!(rig.run_until(1_000, |a| a.app_state() == AppState::FreeForward));
    rig.ticks(50);

    rig.app.stop(&mut rig.sink);
    rig.tick();
    assert_eq!(rig.app.motor_state(), MotorState::Brake);
    assert!(rig.app.channels().is_zero());

    assert!(rig.run_until(50, |a| a.lifecycle() == Lifecycle::Stopped));
    assert_eq!(rig.app.app_state(), AppState::Idle);
    assert_eq!(rig.app.motor_state(), MotorState::Idle);
    assert!(rig.sink.contains(&AppEvent::MoveFinished(MoveOutcome::Aborted(
        AbortReason::Halted
    ))));

    // Further ticks are ignored, even with the button still held.
    let ticks = rig.app.stats().ticks;
    let writes = rig.hw.drive_writes.len();
    rig.ticks(100);
    assert_eq!(rig.app.stats().ticks, ticks);
    assert_eq!(rig.hw.drive_writes.len(), writes);
}

#[test]
fn start_during_halt_cancels_it() {
    let mut rig = Rig::new();
    rig.hw.inputs.feed = true;
    assert!(rig.run_until(1_000, |a| a.app_state() == AppState::FreeForward));

    rig.app.stop(&mut rig.sink);
    rig.app
        .start(&mut rig.hw, &mut rig.sink)
        .expect("cancel never touches the timebase");
    assert_eq!(rig.app.lifecycle(), Lifecycle::Running);
    assert_eq!(rig.hw.starts(), 1);

    rig.ticks(10);
    assert_eq!(rig.app.app_state(), AppState::FreeForward);
}

#[test]
fn restart_after_halt_accepts_new_moves() {
    let mut rig = Rig::new();
    rig.app.stop(&mut rig.sink);
    rig.tick();
    assert_eq!(rig.app.lifecycle(), Lifecycle::Stopped);

    rig.app
        .start(&mut rig.hw, &mut rig.sink)
        .expect("mock timebase starts");
    assert_eq!(rig.hw.starts(), 2);
    rig.ticks(20);

    rig.press_feed(50);
    assert!(rig.run_until(30, |a| a.app_state() == AppState::IncrementForward1));
}

// ── Heartbeat and counters ────────────────────────────────────

#[test]
fn heartbeat_every_interval() {
    let mut rig = Rig::new();
    let done = rig.app.stats().ticks as u32;
    rig.ticks(1_000 - done);
    assert_eq!(heartbeats(&rig.sink), 1);

    let beat = rig.sink.events.iter().find_map(|e| match e {
        AppEvent::Heartbeat(t) => Some(*t),
        _ => None,
    });
    let beat = beat.expect("one heartbeat");
    assert_eq!(beat.ticks, 1_000);
    assert_eq!(beat.app_state, AppState::Idle);

    rig.ticks(1_000);
    assert_eq!(heartbeats(&rig.sink), 2);
}

#[test]
fn heartbeat_disabled_by_zero_interval() {
    let mut config = FeederConfig::default();
    config.app.heartbeat_interval_ticks = 0;
    let mut rig = Rig::with_config(config);
    rig.ticks(3_000);
    assert_eq!(heartbeats(&rig.sink), 0);
}

#[test]
fn missed_ticks_show_in_telemetry() {
    let mut rig = Rig::new();
    rig.app.record_missed_ticks(0);
    rig.app.record_missed_ticks(3);
    assert_eq!(rig.app.stats().tick_overruns, 3);
    assert_eq!(rig.app.telemetry().tick_overruns, 3);
}
