//! Unified error types for the feeder core.
//!
//! Only the lifecycle entry points (`new`, `start`) can fail; everything
//! that happens inside a tick recovers internally to a braked/idle state.
//! All variants are `Copy` so they can be returned without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is inconsistent or could not be parsed.
    Config(&'static str),
    /// The periodic timebase refused to start.
    Timebase(TimebaseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Timebase(e) => write!(f, "timebase: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Timebase errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimebaseError {
    /// The platform has no periodic tick source.
    Unsupported,
    /// The requested rate cannot be produced.
    InvalidRate(u32),
    /// The platform timer API returned an error code.
    Platform(i32),
}

impl fmt::Display for TimebaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => write!(f, "tick source unsupported"),
            Self::InvalidRate(hz) => write!(f, "invalid tick rate {hz} Hz"),
            Self::Platform(rc) => write!(f, "platform error rc={rc}"),
        }
    }
}

impl From<TimebaseError> for Error {
    fn from(e: TimebaseError) -> Self {
        Self::Timebase(e)
    }
}

impl std::error::Error for Error {}
impl std::error::Error for TimebaseError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_subsystem() {
        let e: Error = TimebaseError::InvalidRate(0).into();
        assert_eq!(e.to_string(), "timebase: invalid tick rate 0 Hz");
        assert_eq!(Error::Config("bad").to_string(), "config: bad");
    }
}
