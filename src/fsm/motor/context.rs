//! Motor FSM context: everything the motor handlers read and write.

use crate::config::{Direction, MotorPwmConstants};
use crate::control::commutation::{Commutator, PwmChannelSet};
use crate::control::ramp::SpeedProfile;
use crate::fsm::StateClock;
use crate::fsm::messages::{MotorCommand, MotorEvent};

pub struct MotorContext {
    // --- Timing (written by the engine) ---
    pub ticks_in_state: u64,

    // --- Configuration ---
    pub constants: MotorPwmConstants,

    // --- Inputs for this tick ---
    /// Command delivered this tick; handlers `take()` it.
    pub command: Option<MotorCommand>,
    /// Level of the external driver fault line.
    pub fault_input: bool,

    // --- Move state ---
    pub direction: Direction,
    pub profile: SpeedProfile,
    pub commutator: Commutator,
    pub brake_ticks_left: u32,
    /// Event to report once the motor is back in idle.
    pub finish: Option<MotorEvent>,
    /// Fault already reported for the current assertion of the line.
    pub fault_latched: bool,

    // --- Outputs for this tick ---
    pub event: Option<MotorEvent>,

    // --- Counters ---
    /// Commands dropped because the motor could not accept them.
    pub rejected_commands: u32,
}

impl MotorContext {
    pub fn new(constants: MotorPwmConstants) -> Self {
        let commutator = Commutator::new(&constants);
        Self {
            ticks_in_state: 0,
            constants,
            command: None,
            fault_input: false,
            direction: Direction::Forward,
            profile: SpeedProfile::default(),
            commutator,
            brake_ticks_left: 0,
            finish: None,
            fault_latched: false,
            event: None,
            rejected_commands: 0,
        }
    }

    /// Load this tick's inputs and clear last tick's outputs.
    pub fn begin_tick(&mut self, command: Option<MotorCommand>, fault_input: bool) {
        self.command = command;
        self.fault_input = fault_input;
        self.event = None;
    }

    pub fn channels(&self) -> &PwmChannelSet {
        self.commutator.channels()
    }
}

impl StateClock for MotorContext {
    fn set_ticks_in_state(&mut self, ticks: u64) {
        self.ticks_in_state = ticks;
    }
}
