//! Four-LED phase indicator with priority-based pattern selection.
//!
//! The main loop calls `tick()` once per timebase tick and writes the
//! returned frame to the LED PWM channels. Brightness curves come from
//! the same sine table as the motor commutation, so the chase visibly
//! runs in the direction of travel.
//!
//! ## Priority hierarchy (highest first)
//!
//! 1. **Fault**: all LEDs flash together
//! 2. **Feed pulse**: LED 3 full on for `feed_pulse_ticks` after a feed signal
//! 3. **Motion**: pattern chosen from the application state
//!
//! ## Motion patterns
//!
//! | Pattern       | LEDs  | Offset between LEDs     |
//! |---------------|-------|-------------------------|
//! | Breathing     | 1, 2  | 128 (anti-phase)        |
//! | ChaseForward  | 0..3  | `chase_spacing`         |
//! | ChaseBackward | 3..0  | `chase_spacing`         |
//! | Standby       | 0..3  | 128                     |

use crate::config::IndicatorConstants;
use crate::control::sine;

/// Number of indicator LEDs on the board.
pub const LED_COUNT: usize = 4;

/// Brightness of every LED, `0..=max_duty`.
pub type LedFrame = [u16; LED_COUNT];

/// Motion pattern identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternId {
    Standby,
    Breathing,
    ChaseForward,
    ChaseBackward,
    Off,
}

/// LED pattern engine. Stack-allocated, no heap.
pub struct LedIndicator {
    constants: IndicatorConstants,
    /// Ticks since the active pattern was selected.
    phase: u32,
    active: PatternId,
    motion: PatternId,
    fault: bool,
    feed_pulse_left: u32,
}

impl LedIndicator {
    pub fn new(constants: IndicatorConstants) -> Self {
        Self {
            constants,
            phase: 0,
            active: PatternId::Standby,
            motion: PatternId::Standby,
            fault: false,
            feed_pulse_left: 0,
        }
    }

    /// Select the motion-layer pattern (lowest priority).
    pub fn set_motion_pattern(&mut self, pattern: PatternId) {
        self.motion = pattern;
    }

    /// Set or clear the fault flash (highest priority).
    pub fn set_fault(&mut self, active: bool) {
        self.fault = active;
    }

    /// Restart the feed pulse on LED 3.
    pub fn pulse_feed(&mut self) {
        self.feed_pulse_left = self.constants.feed_pulse_ticks;
    }

    /// Everything off, pulse and fault cleared.
    pub fn clear_all(&mut self) {
        self.motion = PatternId::Off;
        self.active = PatternId::Off;
        self.fault = false;
        self.feed_pulse_left = 0;
        self.phase = 0;
    }

    /// Advance one tick and return the frame to display.
    pub fn tick(&mut self) -> LedFrame {
        if self.motion == self.active {
            self.phase = self.phase.wrapping_add(1);
        } else {
            self.active = self.motion;
            self.phase = 0;
        }

        if self.fault {
            return self.fault_frame();
        }

        let mut frame = self.generate(self.active);
        if self.feed_pulse_left > 0 {
            self.feed_pulse_left -= 1;
            frame[3] = self.constants.max_duty;
        }
        frame
    }

    pub fn active_pattern(&self) -> PatternId {
        self.active
    }

    fn generate(&self, pattern: PatternId) -> LedFrame {
        let t = self.phase as usize;
        let spacing = self.constants.chase_spacing as usize;
        let level = |offset: usize| sine::unipolar(t + offset, self.constants.max_duty);

        match pattern {
            PatternId::Off => [0; LED_COUNT],
            PatternId::Breathing => [0, level(0), level(128), 0],
            PatternId::ChaseForward => core::array::from_fn(|i| level(i * spacing)),
            PatternId::ChaseBackward => {
                core::array::from_fn(|i| level((LED_COUNT - 1 - i) * spacing))
            }
            PatternId::Standby => core::array::from_fn(|i| level(i * 128)),
        }
    }

    fn fault_frame(&self) -> LedFrame {
        let half = self.constants.fault_flash_ticks.max(1);
        if (self.phase / half) % 2 == 0 {
            [self.constants.max_duty; LED_COUNT]
        } else {
            [0; LED_COUNT]
        }
    }
}
