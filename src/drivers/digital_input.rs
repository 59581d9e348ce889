//! Polarity-aware digital input over an `embedded-hal` pin.
//!
//! Buttons on the feeder board are active-low with pull-ups; the driver
//! fault line may be either. A failed read counts as inactive so a
//! flaky pin can never start a move.

use embedded_hal::digital::InputPin;

pub struct DigitalInput<P> {
    pin: P,
    active_low: bool,
    read_errors: u32,
}

impl<P: InputPin> DigitalInput<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self {
            pin,
            active_low,
            read_errors: 0,
        }
    }

    /// Sample the line, resolving polarity.
    pub fn is_active(&mut self) -> bool {
        let level = if self.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        };
        match level {
            Ok(active) => active,
            Err(_) => {
                self.read_errors = self.read_errors.saturating_add(1);
                false
            }
        }
    }

    /// Reads that failed since construction.
    pub fn read_errors(&self) -> u32 {
        self.read_errors
    }
}
