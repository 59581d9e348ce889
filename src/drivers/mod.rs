//! Input, PWM and timing drivers.

pub mod button;
pub mod digital_input;
pub mod hw_timer;
pub mod led_indicator;
pub mod pwm_channel;
pub mod watchdog;
