//! Feed signal mapping: classified button events → feed intents.
//!
//! Pure functions, no state. `Hold` folds into `Long`; the motion FSM
//! tells a single long pulse from a held button by whether the `Long`
//! signal repeats on consecutive ticks.

use crate::drivers::button::ButtonEvent;

/// Feed intent for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedSignal {
    #[default]
    None,
    Short,
    Long,
}

/// Which button produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedSource {
    /// The feed (forward) button.
    #[default]
    Feed,
    /// The reverse button; selects the mirrored direction.
    Reverse,
}

/// Combined request handed to the motion FSM each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedRequest {
    pub signal: FeedSignal,
    pub source: FeedSource,
}

impl FeedRequest {
    pub const NONE: Self = Self {
        signal: FeedSignal::None,
        source: FeedSource::Feed,
    };

    pub fn is_none(&self) -> bool {
        self.signal == FeedSignal::None
    }
}

/// The mapping table.
pub const fn map_event(event: ButtonEvent) -> FeedSignal {
    match event {
        ButtonEvent::None => FeedSignal::None,
        ButtonEvent::Short => FeedSignal::Short,
        ButtonEvent::Long | ButtonEvent::Hold => FeedSignal::Long,
    }
}

/// Merge both buttons into one request; the feed button wins a tie.
pub fn resolve(feed: ButtonEvent, reverse: ButtonEvent) -> FeedRequest {
    match (map_event(feed), map_event(reverse)) {
        (FeedSignal::None, FeedSignal::None) => FeedRequest::NONE,
        (FeedSignal::None, signal) => FeedRequest {
            signal,
            source: FeedSource::Reverse,
        },
        (signal, _) => FeedRequest {
            signal,
            source: FeedSource::Feed,
        },
    }
}
