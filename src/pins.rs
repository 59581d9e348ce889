//! GPIO / peripheral pin assignments for the PickPlaz feeder board (ESP32-C3).
//!
//! Single source of truth: the firmware binary references this module
//! rather than hard-coding pin numbers. Change a pin here and it propagates
//! everywhere.

// ---------------------------------------------------------------------------
// Motor H-bridge
// ---------------------------------------------------------------------------

/// PWM input 1 of the H-bridge (drive channel 0).
pub const MOTOR_IN1_GPIO: i32 = 6;
/// PWM input 2 of the H-bridge (drive channel 1).
pub const MOTOR_IN2_GPIO: i32 = 7;
/// Driver nFAULT output, active-low, open-drain.
pub const MOTOR_FAULT_GPIO: i32 = 10;

/// Drive channels in phase-offset order.
pub const DRIVE_GPIOS: [i32; 2] = [MOTOR_IN1_GPIO, MOTOR_IN2_GPIO];

// ---------------------------------------------------------------------------
// Buttons (active-low with pull-up)
// ---------------------------------------------------------------------------

pub const BUTTON_FEED_GPIO: i32 = 20;
pub const BUTTON_REVERSE_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// Indicator LEDs
// ---------------------------------------------------------------------------

pub const LED0_GPIO: i32 = 0;
pub const LED1_GPIO: i32 = 1;
pub const LED2_GPIO: i32 = 3;
pub const LED3_GPIO: i32 = 5;

/// Indicator LEDs in chase order.
pub const LED_GPIOS: [i32; 4] = [LED0_GPIO, LED1_GPIO, LED2_GPIO, LED3_GPIO];

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC frequency for the motor bridge (20 kHz, above hearing).
pub const MOTOR_PWM_FREQ_HZ: u32 = 20_000;
/// LEDC frequency for the indicator LEDs.
pub const LED_PWM_FREQ_HZ: u32 = 1_000;
