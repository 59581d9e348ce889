//! Motion state handler implementations.
//!
//! Each function has the signature required by the FSM engine:
//! - `on_enter` / `on_exit`: `fn(&mut MotionContext)`
//! - `on_update`: `fn(&mut MotionContext) -> Option<AppState>`

use log::{debug, info, warn};

use super::AppState;
use super::context::{AbortReason, Intent, MotionContext, MoveOutcome};
use crate::app::feed::FeedSignal;
use crate::config::Direction;
use crate::fsm::StateDescriptor;
use crate::fsm::messages::{MotorCommand, MotorEvent};

/// Build the complete motion state table.
pub fn build_state_table() -> [StateDescriptor<AppState, MotionContext>; AppState::COUNT] {
    [
        StateDescriptor {
            id: AppState::Init,
            name: "Init",
            on_enter: Some(init_enter),
            on_exit: None,
            on_update: init_update,
        },
        StateDescriptor {
            id: AppState::Idle,
            name: "Idle",
            on_enter: None,
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: AppState::IncrementForward1,
            name: "IncrementForward1",
            on_enter: Some(increment_forward_1_enter),
            on_exit: None,
            on_update: increment_update,
        },
        StateDescriptor {
            id: AppState::IncrementBackward1,
            name: "IncrementBackward1",
            on_enter: Some(increment_backward_1_enter),
            on_exit: None,
            on_update: increment_update,
        },
        StateDescriptor {
            id: AppState::IncrementForward2,
            name: "IncrementForward2",
            on_enter: Some(increment_forward_2_enter),
            on_exit: None,
            on_update: increment_update,
        },
        StateDescriptor {
            id: AppState::IncrementBackward2,
            name: "IncrementBackward2",
            on_enter: Some(increment_backward_2_enter),
            on_exit: None,
            on_update: increment_update,
        },
        StateDescriptor {
            id: AppState::FreeForward,
            name: "FreeForward",
            on_enter: Some(free_forward_enter),
            on_exit: None,
            on_update: free_update,
        },
        StateDescriptor {
            id: AppState::FreeBackward,
            name: "FreeBackward",
            on_enter: Some(free_backward_enter),
            on_exit: None,
            on_update: free_update,
        },
    ]
}

// ===========================================================================
// INIT: one-time setup
// ===========================================================================

fn init_enter(ctx: &mut MotionContext) {
    ctx.command = None;
    ctx.outcome = None;
}

fn init_update(_ctx: &mut MotionContext) -> Option<AppState> {
    Some(AppState::Idle)
}

// ===========================================================================
// IDLE: the only state that accepts a move
// ===========================================================================

fn idle_update(ctx: &mut MotionContext) -> Option<AppState> {
    let source = match ctx.intent {
        Intent::None => return None,
        Intent::Single(s) | Intent::Double(s) | Intent::Continuous(s) => s,
    };

    if !ctx.motor.is_idle() || ctx.fault_active || ctx.halt_requested {
        if ctx.drop_request() {
            debug!(
                "motion: {:?} dropped (motor={:?} fault={} halt={})",
                ctx.intent, ctx.motor.state, ctx.fault_active, ctx.halt_requested
            );
        }
        return None;
    }

    let direction = ctx.accept_direction(source);
    let next = match (ctx.intent, direction) {
        (Intent::Single(_), Direction::Forward) => AppState::IncrementForward1,
        (Intent::Single(_), Direction::Backward) => AppState::IncrementBackward1,
        (Intent::Double(_), Direction::Forward) => AppState::IncrementForward2,
        (Intent::Double(_), Direction::Backward) => AppState::IncrementBackward2,
        (Intent::Continuous(_), Direction::Forward) => AppState::FreeForward,
        (Intent::Continuous(_), Direction::Backward) => AppState::FreeBackward,
        (Intent::None, _) => return None,
    };
    Some(next)
}

// ===========================================================================
// INCREMENT: fixed-distance moves
// ===========================================================================

fn start_increment(ctx: &mut MotionContext, direction: Direction, distance: u32) {
    ctx.issue(MotorCommand::Run {
        direction,
        speed: ctx.profile.increment_speed,
        distance: Some(distance),
    });
}

fn increment_forward_1_enter(ctx: &mut MotionContext) {
    start_increment(ctx, Direction::Forward, ctx.profile.single_distance);
}

fn increment_backward_1_enter(ctx: &mut MotionContext) {
    start_increment(ctx, Direction::Backward, ctx.profile.single_distance);
}

fn increment_forward_2_enter(ctx: &mut MotionContext) {
    start_increment(ctx, Direction::Forward, ctx.profile.double_distance);
}

fn increment_backward_2_enter(ctx: &mut MotionContext) {
    start_increment(ctx, Direction::Backward, ctx.profile.double_distance);
}

fn increment_update(ctx: &mut MotionContext) -> Option<AppState> {
    if let Some(next) = settle_motor_event(ctx) {
        return Some(next);
    }

    if ctx.halt_requested {
        return halt(ctx);
    }

    if ctx.ticks_in_state >= u64::from(ctx.profile.move_timeout_ticks) {
        warn!("motion: increment timed out after {} ticks", ctx.ticks_in_state);
        ctx.issue(MotorCommand::Stop);
        ctx.outcome = Some(MoveOutcome::Aborted(AbortReason::Timeout));
        ctx.await_release();
        return Some(AppState::Idle);
    }

    None
}

// ===========================================================================
// FREE: run while the feed signal keeps repeating
// ===========================================================================

fn free_forward_enter(ctx: &mut MotionContext) {
    ctx.issue(MotorCommand::Run {
        direction: Direction::Forward,
        speed: ctx.profile.free_run_speed,
        distance: None,
    });
}

fn free_backward_enter(ctx: &mut MotionContext) {
    ctx.issue(MotorCommand::Run {
        direction: Direction::Backward,
        speed: ctx.profile.free_run_speed,
        distance: None,
    });
}

fn free_update(ctx: &mut MotionContext) -> Option<AppState> {
    if let Some(next) = settle_motor_event(ctx) {
        return Some(next);
    }

    if ctx.halt_requested {
        return halt(ctx);
    }

    if ctx.feed.signal == FeedSignal::None {
        ctx.issue(MotorCommand::Stop);
        ctx.outcome = Some(MoveOutcome::Completed);
        return Some(AppState::Idle);
    }

    None
}

// ===========================================================================
// Shared helpers
// ===========================================================================

/// React to a motor event reported for the move in flight.
fn settle_motor_event(ctx: &mut MotionContext) -> Option<AppState> {
    match ctx.motor.event? {
        MotorEvent::Completed => {
            ctx.outcome = Some(MoveOutcome::Completed);
        }
        MotorEvent::Stopped => {
            ctx.outcome = Some(MoveOutcome::Aborted(AbortReason::Halted));
        }
        MotorEvent::Fault => {
            warn!("motion: motor fault, discarding move");
            ctx.issue(MotorCommand::Stop);
            ctx.outcome = Some(MoveOutcome::Aborted(AbortReason::Fault));
            ctx.await_release();
        }
    }
    Some(AppState::Idle)
}

/// Keep the motor braking until it is idle, then park.
fn halt(ctx: &mut MotionContext) -> Option<AppState> {
    if ctx.motor.is_idle() {
        info!("motion: halted");
        ctx.outcome = Some(MoveOutcome::Aborted(AbortReason::Halted));
        return Some(AppState::Idle);
    }
    ctx.issue(MotorCommand::Stop);
    None
}
