use std::fmt::Write as _;
use std::path::PathBuf;

/// Number of samples in one sine period. Must stay a power of two so the
/// runtime lookup can wrap with a mask.
const SINE_TABLE_LEN: usize = 256;
/// Peak sample value (signed 16-bit full scale minus one, symmetric).
const SINE_PEAK: i16 = 32_767;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Generate the commutation sine table once at build time.
    // The firmware only ever indexes this array; no trig runs on target.
    let mut src = String::new();
    let _ = writeln!(src, "/// Samples per sine period.");
    let _ = writeln!(src, "pub const SINE_TABLE_LEN: usize = {SINE_TABLE_LEN};");
    let _ = writeln!(src, "/// Largest absolute sample value.");
    let _ = writeln!(src, "pub const SINE_PEAK: i16 = {SINE_PEAK};");
    let _ = writeln!(src, "/// One full sine period, signed full scale.");
    let _ = writeln!(src, "pub static SINE_TABLE: [i16; SINE_TABLE_LEN] = [");
    for i in 0..SINE_TABLE_LEN {
        let angle = 2.0 * std::f64::consts::PI * i as f64 / SINE_TABLE_LEN as f64;
        let sample = (f64::from(SINE_PEAK) * angle.sin()).round() as i16;
        let _ = writeln!(src, "    {sample},");
    }
    let _ = writeln!(src, "];");

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    if let Err(e) = std::fs::write(out_dir.join("sine_table.rs"), src) {
        panic!("failed to write sine table: {e}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
