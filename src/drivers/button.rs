//! Tick-driven button debounce and press classifier.
//!
//! ## Timing
//!
//! Called once per timebase tick with the *active* level of the line
//! (polarity is resolved by [`DigitalInput`](super::digital_input::DigitalInput)).
//! The debounced level only flips after the raw level has disagreed with it
//! for `debounce_ticks` consecutive ticks. Press and release edges are
//! delayed by the same amount, so the measured press length equals the
//! physical one.
//!
//! ## Classification
//!
//! | Press length (ticks)            | Event on release | While held          |
//! |---------------------------------|------------------|---------------------|
//! | `< short_press_ticks`           | `None` (noise)   | -                   |
//! | `short ..< long_press_ticks`    | `Short`          | -                   |
//! | `>= long_press_ticks`           | `Long`           | `Hold` once `> long`|
//!
//! Nothing but `None` is produced until one debounce window has elapsed
//! after power-on or [`ButtonClassifier::reset`].

use crate::config::AppConstants;

/// One classified observation per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    None,
    Short,
    Long,
    Hold,
}

/// Debounced logical level of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFsmState {
    Low,
    High,
}

/// Classifier thresholds, all in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressThresholds {
    pub debounce_ticks: u16,
    pub short_press_ticks: u16,
    pub long_press_ticks: u16,
}

impl From<&AppConstants> for PressThresholds {
    fn from(c: &AppConstants) -> Self {
        Self {
            debounce_ticks: c.debounce_ticks,
            short_press_ticks: c.short_press_ticks,
            long_press_ticks: c.long_press_ticks,
        }
    }
}

pub struct ButtonClassifier {
    thresholds: PressThresholds,
    level: FeedFsmState,
    /// Consecutive ticks the raw level has disagreed with `level`.
    pending: u16,
    /// Length of the current press, counted while `level` is high.
    press_ticks: u32,
    /// Ticks left before events may be emitted.
    warmup: u16,
}

impl ButtonClassifier {
    pub fn new(thresholds: PressThresholds) -> Self {
        let thresholds = PressThresholds {
            debounce_ticks: thresholds.debounce_ticks.max(1),
            ..thresholds
        };
        Self {
            thresholds,
            level: FeedFsmState::Low,
            pending: 0,
            press_ticks: 0,
            warmup: thresholds.debounce_ticks,
        }
    }

    /// Feed one raw sample; returns this tick's event.
    pub fn update(&mut self, active: bool) -> ButtonEvent {
        if self.warmup > 0 {
            self.warmup -= 1;
            return ButtonEvent::None;
        }

        let raw = if active { FeedFsmState::High } else { FeedFsmState::Low };
        if raw == self.level {
            self.pending = 0;
        } else {
            self.pending += 1;
            if self.pending >= self.thresholds.debounce_ticks {
                self.pending = 0;
                self.level = raw;
                if raw == FeedFsmState::Low {
                    return self.release();
                }
                self.press_ticks = 0;
            }
        }

        match self.level {
            FeedFsmState::High => {
                self.press_ticks = self.press_ticks.saturating_add(1);
                if self.press_ticks > u32::from(self.thresholds.long_press_ticks) {
                    ButtonEvent::Hold
                } else {
                    ButtonEvent::None
                }
            }
            FeedFsmState::Low => ButtonEvent::None,
        }
    }

    /// Return to the power-on state, including the warm-up window.
    pub fn reset(&mut self) {
        *self = Self::new(self.thresholds);
    }

    pub fn level(&self) -> FeedFsmState {
        self.level
    }

    /// Length of the press in progress (0 when released).
    pub fn press_ticks(&self) -> u32 {
        self.press_ticks
    }

    fn release(&mut self) -> ButtonEvent {
        let held = self.press_ticks;
        self.press_ticks = 0;
        if held >= u32::from(self.thresholds.long_press_ticks) {
            ButtonEvent::Long
        } else if held >= u32::from(self.thresholds.short_press_ticks) {
            ButtonEvent::Short
        } else {
            ButtonEvent::None
        }
    }
}
