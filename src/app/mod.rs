//! Application core: pure domain logic, zero I/O.
//!
//! This module holds the feeder's business rules: button signal mapping,
//! orchestration of the motion and motor state machines, and the
//! lifecycle. All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod feed;
pub mod ports;
pub mod service;
