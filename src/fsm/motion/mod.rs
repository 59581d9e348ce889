//! Application motion state machine.
//!
//! Decides the *kind* of move and commands the motor FSM:
//!
//! ```text
//!            short ─▶ IncrementForward1 / IncrementBackward1 ─┐
//!   Init ─▶ Idle ── single long ─▶ IncrementForward2 / ...2 ──┤ motor Completed
//!            ▲  └── repeated long ─▶ FreeForward / FreeBackward ┤ signal None
//!            └───────────────────────────────────────────────────┘
//! ```
//!
//! Moves are only accepted in `Idle` while the motor reports idle; every
//! other state returns to `Idle` before another move can start.

pub mod context;
pub mod states;

use super::{Fsm, StateId};
use crate::config::Direction;
use context::MotionContext;

/// Mechanism-level state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AppState {
    Init = 0,
    Idle = 1,
    IncrementForward1 = 2,
    IncrementBackward1 = 3,
    IncrementForward2 = 4,
    IncrementBackward2 = 5,
    FreeForward = 6,
    FreeBackward = 7,
}

impl AppState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 8;

    /// Travel direction of a moving state.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::IncrementForward1 | Self::IncrementForward2 | Self::FreeForward => {
                Some(Direction::Forward)
            }
            Self::IncrementBackward1 | Self::IncrementBackward2 | Self::FreeBackward => {
                Some(Direction::Backward)
            }
            Self::Init | Self::Idle => None,
        }
    }
}

impl StateId for AppState {
    fn index(self) -> usize {
        self as usize
    }

    fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Init,
            1 => Self::Idle,
            2 => Self::IncrementForward1,
            3 => Self::IncrementBackward1,
            4 => Self::IncrementForward2,
            5 => Self::IncrementBackward2,
            6 => Self::FreeForward,
            7 => Self::FreeBackward,
            _ => {
                debug_assert!(false, "invalid app state index: {idx}");
                Self::Idle
            }
        }
    }
}

/// The motion FSM engine type.
pub type MotionFsm = Fsm<AppState, MotionContext, { AppState::COUNT }>;

/// Build a motion FSM sitting in `Init`.
pub fn new_motion_fsm() -> MotionFsm {
    Fsm::new("motion", states::build_state_table(), AppState::Init)
}
