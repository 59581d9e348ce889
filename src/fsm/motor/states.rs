//! Motor state handler implementations.
//!
//! Each function has the signature required by the FSM engine:
//! - `on_enter` / `on_exit`: `fn(&mut MotorContext)`
//! - `on_update`: `fn(&mut MotorContext) -> Option<MotorState>`

use log::{debug, warn};

use super::MotorState;
use super::context::MotorContext;
use crate::config::Direction;
use crate::control::ramp::SpeedProfile;
use crate::fsm::StateDescriptor;
use crate::fsm::messages::{MotorCommand, MotorEvent};

/// Build the complete motor state table.
pub fn build_state_table() -> [StateDescriptor<MotorState, MotorContext>; MotorState::COUNT] {
    [
        StateDescriptor {
            id: MotorState::Init,
            name: "Init",
            on_enter: Some(init_enter),
            on_exit: None,
            on_update: init_update,
        },
        StateDescriptor {
            id: MotorState::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: MotorState::RunningForward,
            name: "RunningForward",
            on_enter: Some(running_enter),
            on_exit: None,
            on_update: running_update,
        },
        StateDescriptor {
            id: MotorState::RunningBackward,
            name: "RunningBackward",
            on_enter: Some(running_enter),
            on_exit: None,
            on_update: running_update,
        },
        StateDescriptor {
            id: MotorState::Brake,
            name: "Brake",
            on_enter: Some(brake_enter),
            on_exit: None,
            on_update: brake_update,
        },
    ]
}

// ===========================================================================
// INIT
// ===========================================================================

fn init_enter(ctx: &mut MotorContext) {
    ctx.commutator.zero();
}

fn init_update(_ctx: &mut MotorContext) -> Option<MotorState> {
    Some(MotorState::Idle)
}

// ===========================================================================
// IDLE: all channels off, waiting for Run
// ===========================================================================

fn idle_enter(ctx: &mut MotorContext) {
    ctx.commutator.zero();
    ctx.fault_latched = false;
    ctx.event = ctx.finish.take();
}

fn idle_update(ctx: &mut MotorContext) -> Option<MotorState> {
    match ctx.command.take() {
        Some(MotorCommand::Run { direction, speed, distance }) => {
            ctx.direction = direction;
            ctx.profile = SpeedProfile::begin(
                speed,
                ctx.constants.start_speed,
                ctx.constants.ramp_rate,
                distance,
            );
            Some(match direction {
                Direction::Forward => MotorState::RunningForward,
                Direction::Backward => MotorState::RunningBackward,
            })
        }
        Some(MotorCommand::Stop) | None => None,
    }
}

// ===========================================================================
// RUNNING: advance the accumulator and commutate
// ===========================================================================

fn running_enter(ctx: &mut MotorContext) {
    ctx.commutator.render();
}

fn running_update(ctx: &mut MotorContext) -> Option<MotorState> {
    match ctx.command.take() {
        Some(MotorCommand::Stop) => {
            ctx.finish = Some(MotorEvent::Stopped);
            return Some(MotorState::Brake);
        }
        Some(cmd @ MotorCommand::Run { .. }) => {
            ctx.rejected_commands = ctx.rejected_commands.saturating_add(1);
            debug!("motor: {:?} ignored while running", cmd);
        }
        None => {}
    }

    if ctx.fault_input {
        if !ctx.fault_latched {
            ctx.fault_latched = true;
            ctx.event = Some(MotorEvent::Fault);
            warn!("motor: driver fault while running");
        }
    } else {
        ctx.fault_latched = false;
    }

    let units = ctx.profile.advance();
    ctx.commutator.advance(ctx.direction, units);
    ctx.commutator.render();

    if ctx.profile.is_finished() {
        ctx.finish = Some(MotorEvent::Completed);
        return Some(MotorState::Brake);
    }
    None
}

// ===========================================================================
// BRAKE: hold the braking pattern for a fixed time
// ===========================================================================

fn brake_enter(ctx: &mut MotorContext) {
    ctx.brake_ticks_left = ctx.constants.brake_ticks;
    ctx.commutator.brake();
}

fn brake_update(ctx: &mut MotorContext) -> Option<MotorState> {
    if let Some(cmd @ MotorCommand::Run { .. }) = ctx.command.take() {
        ctx.rejected_commands = ctx.rejected_commands.saturating_add(1);
        debug!("motor: {:?} ignored while braking", cmd);
    }

    ctx.brake_ticks_left = ctx.brake_ticks_left.saturating_sub(1);
    if ctx.brake_ticks_left == 0 {
        Some(MotorState::Idle)
    } else {
        None
    }
}
