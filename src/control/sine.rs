//! Precomputed sine table and phase-accumulator helpers.
//!
//! The table is generated by `build.rs` into `$OUT_DIR/sine_table.rs` and
//! compiled in as an immutable array. Phase is a fixed-point table index:
//! the upper bits select a sample, the low [`PHASE_FRAC_BITS`] bits
//! interpolate towards the next one.
//!
//! ```text
//!  phase (u32)  = [ ...cycles... | index (8 bits) | fraction (8 bits) ]
//!                                  └── SINE_TABLE ─┘└─ lerp weight ───┘
//! ```

include!(concat!(env!("OUT_DIR"), "/sine_table.rs"));

/// Fractional bits below the table index.
pub const PHASE_FRAC_BITS: u32 = 8;

/// Phase units in one full electrical cycle.
pub const PHASE_UNITS_PER_CYCLE: u32 = (SINE_TABLE_LEN as u32) << PHASE_FRAC_BITS;

const INDEX_MASK: usize = SINE_TABLE_LEN - 1;
const FRAC_MASK: u32 = (1 << PHASE_FRAC_BITS) - 1;

/// Raw table sample, index taken modulo the table length.
#[inline]
pub fn sample(index: usize) -> i16 {
    SINE_TABLE[index & INDEX_MASK]
}

/// Linearly interpolated sample at a fixed-point `phase`.
///
/// The result never leaves `[-SINE_PEAK, SINE_PEAK]` because it is a
/// convex blend of two table entries.
pub fn sample_at(phase: u32) -> i16 {
    let index = (phase >> PHASE_FRAC_BITS) as usize;
    let frac = (phase & FRAC_MASK) as i32;
    let a = i32::from(sample(index));
    let b = i32::from(sample(index + 1));
    (a + (((b - a) * frac) >> PHASE_FRAC_BITS)) as i16
}

/// Table sample mapped onto `[0, full_scale]` (LED brightness, etc.).
pub fn unipolar(index: usize, full_scale: u16) -> u16 {
    let shifted = (i32::from(sample(index)) + i32::from(SINE_PEAK)) as u32;
    let span = 2 * SINE_PEAK as u32;
    ((shifted * u32::from(full_scale)) / span) as u16
}

/// Wrap an accumulator into one electrical cycle.
#[inline]
pub const fn wrap_phase(phase: u32) -> u32 {
    phase % PHASE_UNITS_PER_CYCLE
}
