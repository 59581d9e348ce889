//! Sine-commutated duty synthesis.
//!
//! A single phase accumulator drives every channel; each channel reads the
//! sine table at its own fixed offset so the windings see smoothly shifted
//! sinusoids instead of on/off steps.
//!
//! ```text
//!   duty_i = center + amplitude * sin(phase + offset_i) / SINE_PEAK
//!   center = max_duty / 2,   amplitude = center * amplitude_percent / 100
//! ```
//!
//! The result is always clamped to `[0, max_duty]`.

use heapless::Vec;

use crate::config::{BrakePattern, Direction, MAX_DRIVE_CHANNELS, MotorPwmConstants};

use super::sine::{self, PHASE_FRAC_BITS, SINE_PEAK};

// ───────────────────────────────────────────────────────────────
// Channel set
// ───────────────────────────────────────────────────────────────

/// Current duty of every drive channel, written once per tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PwmChannelSet {
    duties: Vec<u16, MAX_DRIVE_CHANNELS>,
}

impl PwmChannelSet {
    /// `count` channels, all at zero duty.
    pub fn zeroed(count: usize) -> Self {
        let mut duties = Vec::new();
        for _ in 0..count.min(MAX_DRIVE_CHANNELS) {
            let _ = duties.push(0);
        }
        Self { duties }
    }

    /// Channel set holding `duties`, truncated to the channel limit.
    pub fn from_slice(duties: &[u16]) -> Self {
        let take = duties.len().min(MAX_DRIVE_CHANNELS);
        Self {
            duties: Vec::from_slice(&duties[..take]).unwrap_or_default(),
        }
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.duties
    }

    pub fn len(&self) -> usize {
        self.duties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.duties.is_empty()
    }

    pub fn get(&self, channel: usize) -> Option<u16> {
        self.duties.get(channel).copied()
    }

    /// True when every channel is at zero duty.
    pub fn is_zero(&self) -> bool {
        self.duties.iter().all(|&d| d == 0)
    }

    fn fill(&mut self, duty: u16) {
        for d in &mut self.duties {
            *d = duty;
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Commutator
// ───────────────────────────────────────────────────────────────

/// Phase accumulator plus per-channel duty synthesis.
#[derive(Debug, Clone)]
pub struct Commutator {
    /// Fixed-point phase within one electrical cycle.
    phase: u32,
    offsets: Vec<u8, MAX_DRIVE_CHANNELS>,
    max_duty: u16,
    amplitude_percent: u8,
    brake_pattern: BrakePattern,
    channels: PwmChannelSet,
}

impl Commutator {
    pub fn new(constants: &MotorPwmConstants) -> Self {
        Self {
            phase: 0,
            offsets: constants.phase_offsets.clone(),
            max_duty: constants.max_duty,
            amplitude_percent: constants.amplitude_percent.min(100),
            brake_pattern: constants.brake_pattern,
            channels: PwmChannelSet::zeroed(constants.phase_offsets.len()),
        }
    }

    /// Move the accumulator by `units` in `direction`, wrapping per cycle.
    pub fn advance(&mut self, direction: Direction, units: u32) {
        let units = sine::wrap_phase(units);
        self.phase = match direction {
            Direction::Forward => sine::wrap_phase(self.phase + units),
            Direction::Backward => {
                sine::wrap_phase(self.phase + sine::PHASE_UNITS_PER_CYCLE - units)
            }
        };
    }

    /// Recompute every channel's duty from the current phase.
    pub fn render(&mut self) {
        for (i, duty) in self.channels.duties.iter_mut().enumerate() {
            let offset = self.offsets.get(i).copied().unwrap_or(0);
            *duty = Self::duty_at(
                self.phase,
                offset,
                self.max_duty,
                self.amplitude_percent,
            );
        }
    }

    /// All channels off.
    pub fn zero(&mut self) {
        self.channels.fill(0);
    }

    /// Apply the configured braking pattern.
    pub fn brake(&mut self) {
        match self.brake_pattern {
            BrakePattern::AllLow => self.channels.fill(0),
            BrakePattern::AllHigh => self.channels.fill(self.max_duty),
        }
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn channels(&self) -> &PwmChannelSet {
        &self.channels
    }

    pub fn max_duty(&self) -> u16 {
        self.max_duty
    }

    /// Duty for one channel at `phase` with sine-table `offset`.
    pub fn duty_at(phase: u32, offset: u8, max_duty: u16, amplitude_percent: u8) -> u16 {
        let shifted = phase.wrapping_add(u32::from(offset) << PHASE_FRAC_BITS);
        let s = i32::from(sine::sample_at(shifted));
        let center = i32::from(max_duty / 2);
        let amplitude = center * i32::from(amplitude_percent) / 100;
        let duty = center + s * amplitude / i32::from(SINE_PEAK);
        duty.clamp(0, i32::from(max_duty)) as u16
    }
}
