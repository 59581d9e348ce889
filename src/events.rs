//! Tick hand-off between the timer callback and the main loop.
//!
//! The periodic timer posts ticks; the main loop takes them and runs one
//! [`FeederApp::tick`](crate::app::service::FeederApp::tick) per take.
//! Ticks that pile up while the loop is busy are *not* replayed: the
//! pipeline always works on the latest sample, and the backlog is counted
//! as overruns.
//!
//! ```text
//! ┌──────────────┐  post()  ┌──────────────┐  take()  ┌──────────────┐
//! │ esp_timer cb │─────────▶│ TickMailbox  │─────────▶│  Main Loop   │
//! │ (1 kHz)      │          │ (lock-free)  │          │  (consumer)  │
//! └──────────────┘          └──────────────┘          └──────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

/// Single-producer / single-consumer tick counter.
pub struct TickMailbox {
    pending: AtomicU32,
    overruns: AtomicU32,
}

/// Mailbox shared by the hardware timer and the main loop.
pub static TICKS: TickMailbox = TickMailbox::new();

impl TickMailbox {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
        }
    }

    /// Post one tick. Safe from timer-task or ISR context.
    /// Returns `false` if the previous tick had not been taken yet.
    pub fn post(&self) -> bool {
        self.pending.fetch_add(1, Ordering::Release) == 0
    }

    /// Take every pending tick at once. Returns the number of ticks that
    /// were skipped (pending minus the one the caller will run), or `None`
    /// if nothing was pending.
    pub fn take(&self) -> Option<u32> {
        let pending = self.pending.swap(0, Ordering::Acquire);
        if pending == 0 {
            return None;
        }
        let missed = pending - 1;
        if missed > 0 {
            self.overruns.fetch_add(missed, Ordering::Relaxed);
        }
        Some(missed)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire) != 0
    }

    /// Total ticks dropped since boot.
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }

    /// Drop any pending ticks without counting them (used on restart).
    pub fn clear(&self) {
        self.pending.store(0, Ordering::Release);
    }
}

impl Default for TickMailbox {
    fn default() -> Self {
        Self::new()
    }
}
