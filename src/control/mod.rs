//! Open-loop motion control: sine lookup, phase commutation and the
//! speed profile that paces the phase accumulator.

pub mod commutation;
pub mod ramp;
pub mod sine;
