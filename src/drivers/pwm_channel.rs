//! Duty-scaling wrapper over an `embedded-hal` PWM channel.
//!
//! The motion core works in its own duty range (`max_duty` from
//! configuration). Each physical channel has its own resolution, so every
//! write is rescaled onto `max_duty_cycle()` and clamped there.

use embedded_hal::pwm::SetDutyCycle;

pub struct ScaledPwm<P> {
    pwm: P,
    /// Full-scale value of the incoming duty range.
    source_max: u16,
    last: Option<u16>,
}

impl<P: SetDutyCycle> ScaledPwm<P> {
    pub fn new(pwm: P, source_max: u16) -> Self {
        Self {
            pwm,
            source_max: source_max.max(1),
            last: None,
        }
    }

    /// Write `duty` (core units). Skips the peripheral when unchanged.
    pub fn set(&mut self, duty: u16) -> Result<(), P::Error> {
        let hw = scale_duty(duty, self.source_max, self.pwm.max_duty_cycle());
        if self.last == Some(hw) {
            return Ok(());
        }
        self.pwm.set_duty_cycle(hw)?;
        self.last = Some(hw);
        Ok(())
    }

    /// Last value written to the peripheral, in its own units.
    pub fn last_written(&self) -> Option<u16> {
        self.last
    }
}

/// Map `value` from `[0, from_max]` onto `[0, to_max]`, saturating at the top.
pub fn scale_duty(value: u16, from_max: u16, to_max: u16) -> u16 {
    if from_max == 0 || value >= from_max {
        return to_max;
    }
    (u32::from(value) * u32::from(to_max) / u32::from(from_max)) as u16
}
