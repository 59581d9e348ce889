//! Fuzz target: `ButtonClassifier::update`
//!
//! Each input bit is one raw button sample. The classifier must never
//! panic, must only report `Hold` while the debounced level is pressed,
//! and must report exactly one release event per press.
//!
//! cargo fuzz run fuzz_button_classifier

#![no_main]

use libfuzzer_sys::fuzz_target;
use pickplaz::drivers::button::{ButtonClassifier, ButtonEvent, PressThresholds};

fuzz_target!(|data: &[u8]| {
    // First byte picks the thresholds so odd configurations get covered too.
    let Some((&knob, samples)) = data.split_first() else {
        return;
    };
    let debounce = u16::from(knob & 0x0F) + 1;
    let short = debounce + u16::from(knob >> 4) + 1;
    let thresholds = PressThresholds {
        debounce_ticks: debounce,
        short_press_ticks: short,
        long_press_ticks: short * 4,
    };
    let mut button = ButtonClassifier::new(thresholds);

    let mut releases = 0u32;
    for byte in samples {
        for bit in 0..8 {
            let pressed = byte & (1 << bit) != 0;
            match button.update(pressed) {
                ButtonEvent::Hold => {
                    assert!(button.press_ticks() > u32::from(thresholds.long_press_ticks));
                }
                ButtonEvent::Short | ButtonEvent::Long => {
                    assert_eq!(button.press_ticks(), 0, "release must clear the press");
                    releases += 1;
                }
                ButtonEvent::None => {}
            }
        }
    }

    // At most one release per debounce window of input.
    let samples = samples.len() as u32 * 8;
    assert!(releases <= samples / (2 * u32::from(debounce)) + 1);
});
