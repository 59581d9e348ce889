//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the button and fault inputs, the motor phase PWM channels and the
//! indicator LED channels, exposing them through [`InputPort`],
//! [`DrivePort`] and [`TimebasePort`]. Everything is generic over
//! `embedded-hal` 1.0 traits, so the same adapter runs on ESP-IDF
//! drivers and on host mocks.

use embedded_hal::digital::InputPin;
use embedded_hal::pwm::SetDutyCycle;
use heapless::Vec;
use log::warn;

use crate::app::ports::{DrivePort, InputPort, RawInputs, TimebasePort};
use crate::config::MAX_DRIVE_CHANNELS;
use crate::control::commutation::PwmChannelSet;
use crate::drivers::digital_input::DigitalInput;
use crate::drivers::hw_timer;
use crate::drivers::led_indicator::{LED_COUNT, LedFrame};
use crate::drivers::pwm_channel::ScaledPwm;
use crate::error::TimebaseError;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I, O> {
    feed: DigitalInput<I>,
    reverse: Option<DigitalInput<I>>,
    fault: Option<DigitalInput<I>>,
    drive: Vec<ScaledPwm<O>, MAX_DRIVE_CHANNELS>,
    leds: Vec<ScaledPwm<O>, LED_COUNT>,
    pwm_errors: u32,
}

impl<I: InputPin, O: SetDutyCycle> HardwareAdapter<I, O> {
    /// `feed` is the only required input. `drive_max` and `led_max` are
    /// the core's duty full-scale values for the two channel groups.
    pub fn new(feed: DigitalInput<I>, drive_max: u16, led_max: u16) -> AdapterBuilder<I, O> {
        AdapterBuilder {
            adapter: Self {
                feed,
                reverse: None,
                fault: None,
                drive: Vec::new(),
                leds: Vec::new(),
                pwm_errors: 0,
            },
            drive_max,
            led_max,
        }
    }

    /// PWM writes that failed since construction.
    pub fn pwm_errors(&self) -> u32 {
        self.pwm_errors
    }

    /// Pin reads that failed since construction, across every input.
    pub fn read_errors(&self) -> u32 {
        let optional = |i: &Option<DigitalInput<I>>| i.as_ref().map_or(0, DigitalInput::read_errors);
        self.feed
            .read_errors()
            .saturating_add(optional(&self.reverse))
            .saturating_add(optional(&self.fault))
    }

    pub fn drive_channels(&self) -> usize {
        self.drive.len()
    }

    fn write(pwm_errors: &mut u32, channel: &mut ScaledPwm<O>, duty: u16) {
        if channel.set(duty).is_err() {
            if *pwm_errors == 0 {
                warn!("hardware: PWM write failed");
            }
            *pwm_errors = pwm_errors.saturating_add(1);
        }
    }
}

// ── Builder ───────────────────────────────────────────────────

/// Collects the optional inputs and the PWM channels.
pub struct AdapterBuilder<I, O> {
    adapter: HardwareAdapter<I, O>,
    drive_max: u16,
    led_max: u16,
}

impl<I: InputPin, O: SetDutyCycle> AdapterBuilder<I, O> {
    pub fn reverse(mut self, input: DigitalInput<I>) -> Self {
        self.adapter.reverse = Some(input);
        self
    }

    pub fn fault(mut self, input: DigitalInput<I>) -> Self {
        self.adapter.fault = Some(input);
        self
    }

    /// Add a motor phase channel. Channels beyond the maximum are dropped.
    pub fn drive(mut self, pwm: O) -> Self {
        if self.adapter.drive.push(ScaledPwm::new(pwm, self.drive_max)).is_err() {
            warn!("hardware: more than {} drive channels, extra ignored", MAX_DRIVE_CHANNELS);
        }
        self
    }

    /// Add an indicator LED channel. Channels beyond the maximum are dropped.
    pub fn led(mut self, pwm: O) -> Self {
        if self.adapter.leds.push(ScaledPwm::new(pwm, self.led_max)).is_err() {
            warn!("hardware: more than {} LED channels, extra ignored", LED_COUNT);
        }
        self
    }

    pub fn build(self) -> HardwareAdapter<I, O> {
        self.adapter
    }
}

// ── InputPort implementation ──────────────────────────────────

impl<I: InputPin, O: SetDutyCycle> InputPort for HardwareAdapter<I, O> {
    fn sample(&mut self) -> RawInputs {
        RawInputs {
            feed: self.feed.is_active(),
            reverse: self.reverse.as_mut().is_some_and(DigitalInput::is_active),
            fault: self.fault.as_mut().is_some_and(DigitalInput::is_active),
        }
    }
}

// ── DrivePort implementation ──────────────────────────────────

impl<I: InputPin, O: SetDutyCycle> DrivePort for HardwareAdapter<I, O> {
    fn write_drive(&mut self, channels: &PwmChannelSet) {
        for (channel, &duty) in self.drive.iter_mut().zip(channels.as_slice()) {
            Self::write(&mut self.pwm_errors, channel, duty);
        }
    }

    fn write_leds(&mut self, frame: &LedFrame) {
        for (channel, &duty) in self.leds.iter_mut().zip(frame.iter()) {
            Self::write(&mut self.pwm_errors, channel, duty);
        }
    }
}

// ── TimebasePort implementation ───────────────────────────────

impl<I: InputPin, O: SetDutyCycle> TimebasePort for HardwareAdapter<I, O> {
    fn start_tick(&mut self, hz: u32) -> Result<(), TimebaseError> {
        hw_timer::start_tick_timer(hz)
    }

    fn stop_tick(&mut self) {
        hw_timer::stop_tick_timer();
    }
}
