//! Outbound application events.
//!
//! The [`FeederApp`](super::service::FeederApp) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them.

use crate::app::feed::{FeedSignal, FeedSource};
use crate::fsm::motion::AppState;
use crate::fsm::motion::context::MoveOutcome;
use crate::fsm::motor::MotorState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Tick processing started.
    Started { tick_hz: u32 },

    /// `stop()` was called; braking towards a halt.
    HaltRequested,

    /// Brake-and-halt finished; ticks are ignored until the next start.
    Halted,

    /// The motion FSM transitioned between states.
    AppStateChanged { from: AppState, to: AppState },

    /// The motor FSM transitioned between states.
    MotorStateChanged { from: MotorState, to: MotorState },

    /// A button produced a feed signal this tick.
    FeedSignal { signal: FeedSignal, source: FeedSource },

    /// A move ended.
    MoveFinished(MoveOutcome),

    /// Periodic telemetry snapshot.
    Heartbeat(Telemetry),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telemetry {
    pub ticks: u64,
    pub app_state: AppState,
    pub motor_state: MotorState,
    pub moves_completed: u32,
    pub moves_aborted: u32,
    pub faults: u32,
    pub ignored_requests: u32,
    pub rejected_commands: u32,
    pub tick_overruns: u32,
}
