//! Feeder configuration parameters
//!
//! Fixed at initialisation: the core reads these once in
//! [`FeederApp::new`](crate::app::service::FeederApp::new) and never mutates
//! them. Every duration is expressed in ticks of the periodic timebase.
//! Boards may override the defaults with a JSON blob (see
//! [`FeederConfig::from_json`]).

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::control::sine::PHASE_UNITS_PER_CYCLE;
use crate::error::{Error, Result};

/// Upper bound on commutated drive channels.
pub const MAX_DRIVE_CHANNELS: usize = 4;

/// Motor travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// The mirrored direction.
    pub const fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// How the feed button picks a direction for each accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionPolicy {
    /// Always move the same way.
    Fixed(Direction),
    /// Flip direction on every accepted feed-button move.
    Alternate,
}

/// Drive pattern applied while braking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrakePattern {
    /// Every channel at zero duty (low-side short).
    AllLow,
    /// Every channel at full duty (high-side short).
    AllHigh,
}

// ---------------------------------------------------------------------------
// Application constants
// ---------------------------------------------------------------------------

/// Button timing and move-selection constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConstants {
    // --- Timebase ---
    /// Periodic tick rate requested from the timebase (Hz).
    pub tick_hz: u32,
    /// Heartbeat telemetry period (ticks); 0 disables it.
    pub heartbeat_interval_ticks: u32,

    // --- Button classifier ---
    /// Consecutive ticks a raw level must persist before it is accepted.
    pub debounce_ticks: u16,
    /// Presses shorter than this are discarded as noise.
    pub short_press_ticks: u16,
    /// Presses at or above this are long; held beyond it they repeat `hold`.
    pub long_press_ticks: u16,

    // --- Moves ---
    /// Steps travelled by the `*-1` increment states.
    pub single_increment_steps: u16,
    /// Steps travelled by the `*-2` increment states.
    pub double_increment_steps: u16,
    /// Increment moves that run longer than this are abandoned.
    pub move_timeout_ticks: u32,
    /// Direction selection for the feed button.
    pub direction_policy: DirectionPolicy,
}

impl Default for AppConstants {
    fn default() -> Self {
        Self {
            tick_hz: 1000,
            heartbeat_interval_ticks: 1000, // 1 s

            debounce_ticks: 10,
            short_press_ticks: 30,
            long_press_ticks: 400,

            single_increment_steps: 1,
            double_increment_steps: 2,
            move_timeout_ticks: 1500,
            direction_policy: DirectionPolicy::Fixed(Direction::Forward),
        }
    }
}

// ---------------------------------------------------------------------------
// Motor / PWM constants
// ---------------------------------------------------------------------------

/// Waveform, speed profile and braking constants for the drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorPwmConstants {
    /// Largest duty value the core writes to a drive channel.
    pub max_duty: u16,
    /// Sine amplitude as a percentage of half the duty range.
    pub amplitude_percent: u8,
    /// Sine-table phase offset of each channel (table index units, 256 per
    /// cycle). The channel count equals the number of offsets.
    pub phase_offsets: Vec<u8, MAX_DRIVE_CHANNELS>,
    /// Phase units travelled per step (65 536 = one electrical cycle).
    pub phase_units_per_step: u32,
    /// Speed the accumulator starts at and decelerates towards (units/tick).
    pub start_speed: u32,
    /// Speed change per tick while ramping (units/tick²).
    pub ramp_rate: u32,
    /// Cruise speed for increment moves (units/tick).
    pub increment_speed: u32,
    /// Cruise speed while free-running (units/tick).
    pub free_run_speed: u32,
    /// Ticks spent in brake before returning to idle.
    pub brake_ticks: u32,
    /// Channel pattern held during braking.
    pub brake_pattern: BrakePattern,
}

impl Default for MotorPwmConstants {
    fn default() -> Self {
        let mut phase_offsets = Vec::new();
        // IN1 / IN2 of the H-bridge, driven in anti-phase.
        let _ = phase_offsets.push(0);
        let _ = phase_offsets.push(128);

        Self {
            max_duty: 2048,
            amplitude_percent: 100,
            phase_offsets,
            phase_units_per_step: PHASE_UNITS_PER_CYCLE,
            start_speed: 64,
            ramp_rate: 8,
            increment_speed: 640,  // ~100 ms per step at 1 kHz
            free_run_speed: 1280,
            brake_ticks: 8,
            brake_pattern: BrakePattern::AllLow,
        }
    }
}

// ---------------------------------------------------------------------------
// Indicator constants
// ---------------------------------------------------------------------------

/// LED phase-indicator constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConstants {
    /// Full-brightness duty for an indicator LED.
    pub max_duty: u16,
    /// Sine-table offset between neighbouring LEDs in the chase pattern.
    pub chase_spacing: u8,
    /// Ticks LED 3 stays lit after a feed signal.
    pub feed_pulse_ticks: u32,
    /// Half-period of the fault flash (ticks).
    pub fault_flash_ticks: u32,
}

impl Default for IndicatorConstants {
    fn default() -> Self {
        Self {
            max_duty: 2048,
            chase_spacing: 55,
            feed_pulse_ticks: 500,
            fault_flash_ticks: 62, // ~8 Hz
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level configuration
// ---------------------------------------------------------------------------

/// Complete feeder configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeederConfig {
    pub app: AppConstants,
    pub motor: MotorPwmConstants,
    pub indicator: IndicatorConstants,
}

impl FeederConfig {
    /// Parse a board override blob.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))
    }

    /// Reject values the state machines cannot honour.
    pub fn validate(&self) -> Result<()> {
        let a = &self.app;
        let m = &self.motor;

        if a.tick_hz == 0 {
            return Err(Error::Config("tick_hz must be non-zero"));
        }
        if a.debounce_ticks == 0 {
            return Err(Error::Config("debounce_ticks must be non-zero"));
        }
        if a.short_press_ticks >= a.long_press_ticks {
            return Err(Error::Config("short_press_ticks must be below long_press_ticks"));
        }
        if a.single_increment_steps == 0 || a.double_increment_steps == 0 {
            return Err(Error::Config("increment step counts must be non-zero"));
        }
        if a.move_timeout_ticks == 0 {
            return Err(Error::Config("move_timeout_ticks must be non-zero"));
        }

        if m.max_duty == 0 {
            return Err(Error::Config("max_duty must be non-zero"));
        }
        if m.amplitude_percent > 100 {
            return Err(Error::Config("amplitude_percent exceeds 100"));
        }
        if m.phase_offsets.is_empty() {
            return Err(Error::Config("at least one drive channel is required"));
        }
        if m.phase_units_per_step == 0 {
            return Err(Error::Config("phase_units_per_step must be non-zero"));
        }
        if m.start_speed == 0 || m.ramp_rate == 0 {
            return Err(Error::Config("start_speed and ramp_rate must be non-zero"));
        }
        let half_cycle = PHASE_UNITS_PER_CYCLE / 2;
        for speed in [m.start_speed, m.increment_speed, m.free_run_speed] {
            if speed >= half_cycle {
                return Err(Error::Config("speed must stay below half a cycle per tick"));
            }
        }
        if m.increment_speed < m.start_speed || m.free_run_speed < m.start_speed {
            return Err(Error::Config("cruise speeds must not be below start_speed"));
        }
        if m.brake_ticks == 0 {
            return Err(Error::Config("brake_ticks must be non-zero"));
        }
        let longest = u32::from(a.single_increment_steps.max(a.double_increment_steps));
        if longest.checked_mul(m.phase_units_per_step).is_none() {
            return Err(Error::Config("increment distance overflows"));
        }

        if self.indicator.max_duty == 0 {
            return Err(Error::Config("indicator max_duty must be non-zero"));
        }
        Ok(())
    }

    /// Distance of an increment of `steps` steps, in phase units.
    pub fn increment_distance(&self, steps: u16) -> u32 {
        u32::from(steps).saturating_mul(self.motor.phase_units_per_step)
    }
}
