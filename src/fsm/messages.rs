//! The two narrow message types exchanged between the state machines.
//!
//! ```text
//!   motion FSM ──MotorCommand──▶ motor FSM
//!   motion FSM ◀──MotorStatus─── motor FSM
//! ```
//!
//! Neither machine touches the other's state; each tick the service moves
//! at most one command down and one status up.

use crate::config::Direction;

use super::motor::MotorState;

/// Command issued by the motion FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCommand {
    /// Start a move. `distance = None` runs until [`MotorCommand::Stop`].
    Run {
        direction: Direction,
        /// Cruise speed in phase units per tick.
        speed: u32,
        /// Travel in phase units.
        distance: Option<u32>,
    },
    /// Brake now, whatever the motor is doing.
    Stop,
}

/// One-shot notifications raised by the motor FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorEvent {
    /// A distance move covered its distance and finished braking.
    Completed,
    /// A move was cut short by `Stop` and finished braking.
    Stopped,
    /// The external fault line asserted while running.
    Fault,
}

/// Status reported by the motor FSM at the end of every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorStatus {
    pub state: MotorState,
    /// Set for exactly one tick when something happened.
    pub event: Option<MotorEvent>,
}

impl MotorStatus {
    pub const fn new(state: MotorState) -> Self {
        Self { state, event: None }
    }

    pub fn is_idle(&self) -> bool {
        self.state == MotorState::Idle
    }
}
