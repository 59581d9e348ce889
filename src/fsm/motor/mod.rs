//! Motor drive state machine.
//!
//! Realises a [`MotorCommand`](super::messages::MotorCommand) as a
//! sine-commutated PWM waveform:
//!
//! ```text
//!   Init ──▶ Idle ──Run(fwd)──▶ RunningForward ──┐
//!             ▲  └──Run(back)─▶ RunningBackward ─┤ distance reached / Stop
//!             └──── brake_ticks elapsed ── Brake ◀┘
//! ```
//!
//! The channel set is written only by these handlers, once per tick.

pub mod context;
pub mod states;

use super::{Fsm, StateId};
use context::MotorContext;

/// Motor-level state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MotorState {
    Init = 0,
    Idle = 1,
    RunningForward = 2,
    RunningBackward = 3,
    Brake = 4,
}

impl MotorState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 5;
}

impl StateId for MotorState {
    fn index(self) -> usize {
        self as usize
    }

    fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Init,
            1 => Self::Idle,
            2 => Self::RunningForward,
            3 => Self::RunningBackward,
            4 => Self::Brake,
            _ => {
                debug_assert!(false, "invalid motor state index: {idx}");
                Self::Brake
            }
        }
    }
}

/// The motor FSM engine type.
pub type MotorFsm = Fsm<MotorState, MotorContext, { MotorState::COUNT }>;

/// Build a motor FSM sitting in `Init`.
pub fn new_motor_fsm() -> MotorFsm {
    Fsm::new("motor", states::build_state_table(), MotorState::Init)
}
