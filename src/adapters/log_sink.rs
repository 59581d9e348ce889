//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (the ESP-IDF logger on target, UART / USB-CDC).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::fsm::motion::context::MoveOutcome;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Heartbeat(t) => {
                info!(
                    "BEAT  | ticks={} | app={:?} motor={:?} | moves ok={} aborted={} | \
                     faults={} ignored={} rejected={} overruns={}",
                    t.ticks,
                    t.app_state,
                    t.motor_state,
                    t.moves_completed,
                    t.moves_aborted,
                    t.faults,
                    t.ignored_requests,
                    t.rejected_commands,
                    t.tick_overruns,
                );
            }
            AppEvent::AppStateChanged { from, to } => {
                info!("APP   | {:?} -> {:?}", from, to);
            }
            AppEvent::MotorStateChanged { from, to } => {
                info!("MOTOR | {:?} -> {:?}", from, to);
            }
            AppEvent::FeedSignal { signal, source } => {
                info!("FEED  | {:?} from {:?}", signal, source);
            }
            AppEvent::MoveFinished(MoveOutcome::Completed) => {
                info!("MOVE  | completed");
            }
            AppEvent::MoveFinished(MoveOutcome::Aborted(reason)) => {
                warn!("MOVE  | aborted: {:?}", reason);
            }
            AppEvent::Started { tick_hz } => {
                info!("START | tick={}Hz", tick_hz);
            }
            AppEvent::HaltRequested => {
                info!("HALT  | requested");
            }
            AppEvent::Halted => {
                info!("HALT  | stopped");
            }
        }
    }
}
