//! End-to-end feed scenarios: raw button levels in, PWM duties and
//! application events out.

use crate::mock_hw::Rig;

use pickplaz::app::events::AppEvent;
use pickplaz::app::feed::{FeedSignal, FeedSource};
use pickplaz::config::{DirectionPolicy, FeederConfig};
use pickplaz::fsm::motion::AppState;
use pickplaz::fsm::motion::context::{AbortReason, MoveOutcome};
use pickplaz::fsm::motor::MotorState;

/// Longest a default increment can take, brake included.
const MOVE_LIMIT: u32 = 1_000;

fn entered(rig: &Rig, state: AppState) -> usize {
    rig.sink
        .count(|e| matches!(e, AppEvent::AppStateChanged { to, .. } if *to == state))
}

fn settle(rig: &mut Rig) {
    assert!(rig.run_until(MOVE_LIMIT, |a| {
        a.app_state() == AppState::Idle && a.motor_state() == MotorState::Idle
    }));
}

// ── Short press ───────────────────────────────────────────────

#[test]
fn short_press_runs_single_increment() {
    let mut rig = Rig::new();
    assert_eq!(rig.app.app_state(), AppState::Idle);

    rig.press_feed(50);
    assert!(rig.run_until(30, |a| a.app_state() == AppState::IncrementForward1));
    assert!(rig.sink.contains(&AppEvent::FeedSignal {
        signal: FeedSignal::Short,
        source: FeedSource::Feed,
    }));

    rig.ticks(20);
    assert_eq!(rig.app.motor_state(), MotorState::RunningForward);
    assert!(!rig.app.channels().is_zero());

    settle(&mut rig);
    assert_eq!(rig.app.stats().moves_completed, 1);
    assert!(rig.sink.contains(&AppEvent::MoveFinished(MoveOutcome::Completed)));
    assert_eq!(rig.hw.last_drive(), Some(&[0u16, 0][..]));
}

#[test]
fn press_below_short_threshold_is_noise() {
    let mut rig = Rig::new();
    rig.press_feed(20);
    rig.ticks(50);
    assert_eq!(rig.app.app_state(), AppState::Idle);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::FeedSignal { .. })), 0);
}

#[test]
fn sub_debounce_glitches_are_ignored() {
    let mut rig = Rig::new();
    for _ in 0..20 {
        rig.press_feed(5);
        rig.ticks(5);
    }
    rig.ticks(50);
    assert_eq!(rig.app.app_state(), AppState::Idle);
    assert_eq!(rig.app.stats().moves_completed, 0);
}

// ── Long press ────────────────────────────────────────────────

#[test]
fn single_long_press_runs_double_increment() {
    let mut rig = Rig::new();
    rig.press_feed(400);
    assert!(rig.run_until(30, |a| a.app_state() == AppState::IncrementForward2));
    assert_eq!(entered(&rig, AppState::FreeForward), 0);

    settle(&mut rig);
    assert_eq!(rig.app.stats().moves_completed, 1);
    assert_eq!(entered(&rig, AppState::IncrementForward2), 1);
}

#[test]
fn held_button_free_runs_until_release() {
    let mut rig = Rig::new();
    rig.hw.inputs.feed = true;
    assert!(rig.run_until(MOVE_LIMIT, |a| a.app_state() == AppState::FreeForward));

    rig.ticks(2_000);
    assert_eq!(rig.app.app_state(), AppState::FreeForward);
    assert_eq!(rig.app.motor_state(), MotorState::RunningForward);

    rig.hw.inputs.feed = false;
    assert!(rig.run_until(30, |a| a.app_state() == AppState::Idle));
    settle(&mut rig);
    assert_eq!(rig.app.stats().moves_completed, 1);
    assert_eq!(entered(&rig, AppState::IncrementForward2), 0);
}

// ── Direction selection ───────────────────────────────────────

#[test]
fn reverse_button_moves_backward() {
    let mut rig = Rig::new();
    rig.press_reverse(50);
    assert!(rig.run_until(30, |a| a.app_state() == AppState::IncrementBackward1));
    rig.ticks(5);
    assert_eq!(rig.app.motor_state(), MotorState::RunningBackward);
    settle(&mut rig);
}

#[test]
fn alternate_policy_flips_between_moves() {
    let mut config = FeederConfig::default();
    config.app.direction_policy = DirectionPolicy::Alternate;
    let mut rig = Rig::with_config(config);

    rig.press_feed(50);
    assert!(rig.run_until(30, |a| a.app_state() == AppState::IncrementForward1));
    settle(&mut rig);

    rig.press_feed(50);
    assert!(rig.run_until(30, |a| a.app_state() == AppState::IncrementBackward1));
    settle(&mut rig);
    assert_eq!(rig.app.stats().moves_completed, 2);
}

// ── Overlapping requests ──────────────────────────────────────

#[test]
fn press_during_move_is_not_queued() {
    let mut rig = Rig::new();
    rig.press_feed(50);
    assert!(rig.run_until(30, |a| a.app_state() == AppState::IncrementForward1));

    rig.press_feed(50);
    settle(&mut rig);
    rig.ticks(200);

    assert_eq!(rig.app.app_state(), AppState::Idle);
    assert_eq!(entered(&rig, AppState::IncrementForward1), 1);
    assert_eq!(rig.app.stats().moves_completed, 1);
    assert_eq!(rig.app.stats().rejected_commands, 0);
}

#[test]
fn press_while_braking_is_dropped() {
    let mut config = FeederConfig::default();
    config.motor.brake_ticks = 200;
    let mut rig = Rig::with_config(config);

    rig.hw.inputs.feed = true;
    assert!(rig.run_until(MOVE_LIMIT, |a| a.app_state() == AppState::FreeForward));
    rig.hw.inputs.feed = false;
    assert!(rig.run_until(30, |a| a.app_state() == AppState::Idle));
    assert_eq!(rig.app.motor_state(), MotorState::Brake);

    rig.press_feed(50);
    rig.ticks(15);
    assert_eq!(rig.app.app_state(), AppState::Idle);
    assert_eq!(rig.app.motor_state(), MotorState::Brake);
    assert_eq!(rig.app.stats().ignored_requests, 1);
}

// ── Fault handling ────────────────────────────────────────────

#[test]
fn motor_fault_brakes_and_discards_move() {
    let mut rig = Rig::new();
    rig.press_feed(50);
    assert!(rig.run_until(30, |a| a.app_state() == AppState::IncrementForward1));
    rig.ticks(20);

    rig.hw.inputs.fault = true;
    assert!(rig.run_until(5, |a| a.app_state() == AppState::Idle));
    rig.tick();
    assert_eq!(rig.app.motor_state(), MotorState::Brake);

    let stats = rig.app.stats();
    assert_eq!(stats.faults, 1);
    assert_eq!(stats.moves_aborted, 1);
    assert!(rig.sink.contains(&AppEvent::MoveFinished(MoveOutcome::Aborted(AbortReason::Fault))));

    // Fault overlay: every LED shows the same level.
    let frame = rig.hw.led_writes.last().copied().unwrap_or_default();
    assert!(frame.iter().all(|&d| d == frame[0]));

    // No automatic retry, and no new moves while the line is asserted.
    settle(&mut rig);
    rig.press_feed(50);
    rig.ticks(20);
    assert_eq!(rig.app.app_state(), AppState::Idle);
    assert_eq!(rig.app.stats().ignored_requests, 1);

    rig.hw.inputs.fault = false;
    rig.press_feed(50);
    assert!(rig.run_until(30, |a| a.app_state() == AppState::IncrementForward1));
}

#[test]
fn fault_during_hold_is_not_retried_within_the_press() {
    let mut rig = Rig::new();
    rig.hw.inputs.feed = true;
    assert!(rig.run_until(MOVE_LIMIT, |a| a.app_state() == AppState::FreeForward));
    rig.ticks(50);

    rig.hw.inputs.fault = true;
    rig.tick();
    rig.hw.inputs.fault = false;
    assert!(rig.run_until(5, |a| a.app_state() == AppState::Idle));

    // Button still held long after the brake has finished.
    rig.ticks(500);
    assert_eq!(rig.app.app_state(), AppState::Idle);
    assert_eq!(rig.app.motor_state(), MotorState::Idle);
    assert_eq!(entered(&rig, AppState::FreeForward), 1);
    assert_eq!(rig.app.stats().moves_aborted, 1);
    assert_eq!(rig.app.stats().ignored_requests, 0);

    // Releasing ends the press without starting anything.
    rig.hw.inputs.feed = false;
    rig.ticks(50);
    assert_eq!(rig.app.app_state(), AppState::Idle);
    assert_eq!(entered(&rig, AppState::IncrementForward2), 0);

    rig.press_feed(50);
    assert!(rig.run_until(30, |a| a.app_state() == AppState::IncrementForward1));
}

#[test]
fn held_button_over_fault_counts_one_dropped_request() {
    let mut rig = Rig::new();
    rig.hw.inputs.fault = true;
    rig.hw.inputs.feed = true;
    rig.ticks(1_000);
    rig.hw.inputs.feed = false;
    rig.ticks(20);

    assert_eq!(rig.app.app_state(), AppState::Idle);
    assert_eq!(rig.app.stats().ignored_requests, 1);
}

// ── Output range ──────────────────────────────────────────────

#[test]
fn duties_never_exceed_configured_maximum() {
    let mut rig = Rig::new();
    rig.press_feed(400);
    assert!(rig.run_until(30, |a| a.app_state() == AppState::IncrementForward2));
    settle(&mut rig);
    rig.hw.inputs.feed = true;
    rig.ticks(1_500);
    rig.hw.inputs.feed = false;
    settle(&mut rig);

    let config = FeederConfig::default();
    assert!(rig.hw.max_drive_duty() > 0);
    assert!(rig.hw.max_drive_duty() <= config.motor.max_duty);
    assert!(rig.hw.max_led_duty() <= config.indicator.max_duty);
}

#[test]
fn reduced_amplitude_narrows_duty_swing() {
    let mut config = FeederConfig::default();
    config.motor.amplitude_percent = 50;
    let max = config.motor.max_duty;
    let mut rig = Rig::with_config(config);

    rig.press_feed(50);
    assert!(rig.run_until(30, |a| a.app_state() == AppState::IncrementForward1));
    rig.ticks(100);
    let running: Vec<u16> = rig
        .hw
        .drive_writes
        .iter()
        .rev()
        .take(100)
        .flatten()
        .copied()
        .collect();
    assert!(running.iter().all(|&d| d >= max / 4 - 1 && d <= max * 3 / 4 + 1));
}
