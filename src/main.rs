//! PickPlaz feeder firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter (Input + Drive + Timebase)   LogEventSink     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              FeederApp (pure logic)                    │    │
//! │  │  Buttons · Feed mapper · Motion FSM · Motor FSM · LEDs │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  esp_timer 1 kHz ──▶ TICKS mailbox ──▶ main loop · watchdog    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, Input, PinDriver, Pull};
use esp_idf_svc::hal::ledc::config::TimerConfig;
use esp_idf_svc::hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use log::{info, warn};

use pickplaz::adapters::hardware::HardwareAdapter;
use pickplaz::adapters::log_sink::LogEventSink;
use pickplaz::app::service::FeederApp;
use pickplaz::config::FeederConfig;
use pickplaz::drivers::digital_input::DigitalInput;
use pickplaz::drivers::hw_timer;
use pickplaz::drivers::watchdog::Watchdog;
use pickplaz::events::TICKS;
use pickplaz::pins;

/// Board override baked in at build time, if any.
const BOARD_CONFIG_JSON: Option<&str> = option_env!("PICKPLAZ_CONFIG_JSON");

/// FreeRTOS ticks to wait for a motion tick before feeding the watchdog anyway.
const TICK_WAIT_RTOS_TICKS: u32 = 10;

fn input(gpio: i32) -> Result<DigitalInput<PinDriver<'static, AnyIOPin, Input>>> {
    // SAFETY: every GPIO number comes from `pins` and is claimed once.
    let pin = unsafe { AnyIOPin::new(gpio) };
    let mut driver = PinDriver::input(pin)?;
    driver.set_pull(Pull::Up)?;
    Ok(DigitalInput::new(driver, true))
}

fn load_config() -> FeederConfig {
    match BOARD_CONFIG_JSON.map(FeederConfig::from_json) {
        Some(Ok(cfg)) => {
            info!("Config: board override");
            cfg
        }
        Some(Err(e)) => {
            warn!("Board config rejected ({}), using defaults", e);
            FeederConfig::default()
        }
        None => FeederConfig::default(),
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PickPlaz feeder v{}              ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config();
    let peripherals = Peripherals::take()?;
    let ledc = peripherals.ledc;

    // ── 2. LEDC: motor bridge on timer 0, LEDs on timer 1 ─────
    // 11-bit resolution gives 0..=2047, the core's default full scale.
    let motor_timer = LedcTimerDriver::new(
        ledc.timer0,
        &TimerConfig::default()
            .frequency(Hertz(pins::MOTOR_PWM_FREQ_HZ))
            .resolution(Resolution::Bits11),
    )?;
    let led_timer = LedcTimerDriver::new(
        ledc.timer1,
        &TimerConfig::default()
            .frequency(Hertz(pins::LED_PWM_FREQ_HZ))
            .resolution(Resolution::Bits11),
    )?;

    // SAFETY (all `Any*Pin::new` below): GPIO numbers come from `pins`,
    // each claimed exactly once.
    let in1 = LedcDriver::new(ledc.channel0, &motor_timer, unsafe {
        AnyOutputPin::new(pins::DRIVE_GPIOS[0])
    })?;
    let in2 = LedcDriver::new(ledc.channel1, &motor_timer, unsafe {
        AnyOutputPin::new(pins::DRIVE_GPIOS[1])
    })?;
    let led0 = LedcDriver::new(ledc.channel2, &led_timer, unsafe {
        AnyOutputPin::new(pins::LED_GPIOS[0])
    })?;
    let led1 = LedcDriver::new(ledc.channel3, &led_timer, unsafe {
        AnyOutputPin::new(pins::LED_GPIOS[1])
    })?;
    let led2 = LedcDriver::new(ledc.channel4, &led_timer, unsafe {
        AnyOutputPin::new(pins::LED_GPIOS[2])
    })?;
    let led3 = LedcDriver::new(ledc.channel5, &led_timer, unsafe {
        AnyOutputPin::new(pins::LED_GPIOS[3])
    })?;

    // ── 3. Adapters ───────────────────────────────────────────
    let mut hw = HardwareAdapter::new(
        input(pins::BUTTON_FEED_GPIO)?,
        config.motor.max_duty,
        config.indicator.max_duty,
    )
    .reverse(input(pins::BUTTON_REVERSE_GPIO)?)
    .fault(input(pins::MOTOR_FAULT_GPIO)?)
    .drive(in1)
    .drive(in2)
    .led(led0)
    .led(led1)
    .led(led2)
    .led(led3)
    .build();
    let mut log_sink = LogEventSink::new();

    // ── 4. Core + watchdog ────────────────────────────────────
    let mut app = FeederApp::new(config)?;
    let watchdog = Watchdog::default();
    app.start(&mut hw, &mut log_sink)?;

    // ── 5. Tick loop ──────────────────────────────────────────
    loop {
        hw_timer::wait_for_tick(TICK_WAIT_RTOS_TICKS);

        if let Some(missed) = TICKS.take() {
            app.record_missed_ticks(missed);
            app.tick(&mut hw, &mut log_sink);

            let errors = hw.read_errors().saturating_add(hw.pwm_errors());
            if errors > 0 && app.stats().ticks % u64::from(app.config().app.tick_hz) == 0 {
                warn!("Hardware: {} pin/PWM errors so far", errors);
            }
        }

        watchdog.feed();
    }
}
