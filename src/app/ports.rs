//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ FeederApp (domain)
//! ```
//!
//! Driven adapters (buttons, PWM channels, the periodic timer, event sinks)
//! implement these traits. The [`FeederApp`](super::service::FeederApp)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::control::commutation::PwmChannelSet;
use crate::drivers::led_indicator::LedFrame;
use crate::error::TimebaseError;

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw input levels for one tick, polarity already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawInputs {
    /// Feed button is pressed.
    pub feed: bool,
    /// Reverse button is pressed (always `false` on boards without one).
    pub reverse: bool,
    /// External motor driver fault line is asserted.
    pub fault: bool,
}

/// Read-side port: sampled once at the start of every tick.
pub trait InputPort {
    fn sample(&mut self) -> RawInputs;
}

// ───────────────────────────────────────────────────────────────
// Drive port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: receives every duty value once per tick.
///
/// Values are in the core's range (`0..=max_duty` of the relevant
/// constants block). Implementations rescale onto their hardware and
/// must never write more than their channel's maximum.
pub trait DrivePort {
    /// Write the motor phase duties.
    fn write_drive(&mut self, channels: &PwmChannelSet);

    /// Write the indicator LED brightness frame.
    fn write_leds(&mut self, frame: &LedFrame);
}

// ───────────────────────────────────────────────────────────────
// Timebase port (driven adapter: domain ↔ periodic timer)
// ───────────────────────────────────────────────────────────────

/// The periodic tick source. The core only asks it to start and stop;
/// tick delivery itself is the caller's loop.
pub trait TimebasePort {
    /// Begin ticking at `hz`.
    fn start_tick(&mut self, hz: u32) -> Result<(), TimebaseError>;

    /// Stop ticking. Safe to call when not running.
    fn stop_tick(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
