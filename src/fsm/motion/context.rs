//! Motion FSM context: the blackboard shared by all motion handlers.
//!
//! The service fills the inputs once per tick (feed request, last motor
//! status, fault and halt flags), runs the FSM, then collects the
//! outputs (at most one motor command, at most one move outcome).

use crate::app::feed::{FeedRequest, FeedSignal, FeedSource};
use crate::config::{Direction, DirectionPolicy, FeederConfig};
use crate::fsm::StateClock;
use crate::fsm::messages::{MotorCommand, MotorStatus};

use super::super::motor::MotorState;

// ---------------------------------------------------------------------------
// Intent and outcome
// ---------------------------------------------------------------------------

/// What the feed signals amount to this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intent {
    #[default]
    None,
    /// A short press: one small increment.
    Single(FeedSource),
    /// A single long pulse: one large increment.
    Double(FeedSource),
    /// Long signal repeating every tick: run until it stops.
    Continuous(FeedSource),
}

/// Why a move ended early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    Fault,
    Timeout,
    Halted,
}

/// How a move ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Completed,
    Aborted(AbortReason),
}

/// Move parameters derived from configuration at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveProfile {
    pub single_distance: u32,
    pub double_distance: u32,
    pub increment_speed: u32,
    pub free_run_speed: u32,
    pub move_timeout_ticks: u32,
    pub direction_policy: DirectionPolicy,
}

impl From<&FeederConfig> for MoveProfile {
    fn from(c: &FeederConfig) -> Self {
        Self {
            single_distance: c.increment_distance(c.app.single_increment_steps),
            double_distance: c.increment_distance(c.app.double_increment_steps),
            increment_speed: c.motor.increment_speed,
            free_run_speed: c.motor.free_run_speed,
            move_timeout_ticks: c.app.move_timeout_ticks,
            direction_policy: c.app.direction_policy,
        }
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

pub struct MotionContext {
    // --- Timing (written by the engine) ---
    pub ticks_in_state: u64,

    // --- Configuration ---
    pub profile: MoveProfile,

    // --- Inputs for this tick ---
    pub feed: FeedRequest,
    pub intent: Intent,
    /// Motor status as of the end of the previous tick.
    pub motor: MotorStatus,
    /// External driver fault line is asserted.
    pub fault_active: bool,
    /// `stop()` was requested; finish braking and park in idle.
    pub halt_requested: bool,

    // --- Memory ---
    /// Direction of the last accepted feed-button move.
    pub last_feed_direction: Direction,
    long_streak: u32,
    long_source: FeedSource,
    /// A move was aborted under a live press; ignore feed signals until
    /// the press ends.
    release_pending: bool,
    /// The last dropped request was a hold, so repeats are not recounted.
    hold_dropped: bool,

    // --- Outputs for this tick ---
    pub command: Option<MotorCommand>,
    pub outcome: Option<MoveOutcome>,

    // --- Counters ---
    /// Requests dropped because no move could be accepted.
    pub ignored_requests: u32,
}

impl MotionContext {
    pub fn new(profile: MoveProfile) -> Self {
        Self {
            ticks_in_state: 0,
            profile,
            feed: FeedRequest::NONE,
            intent: Intent::None,
            motor: MotorStatus::new(MotorState::Init),
            fault_active: false,
            halt_requested: false,
            // So the first alternating move goes forward.
            last_feed_direction: Direction::Backward,
            long_streak: 0,
            long_source: FeedSource::Feed,
            release_pending: false,
            hold_dropped: false,
            command: None,
            outcome: None,
            ignored_requests: 0,
        }
    }

    /// Load this tick's inputs and clear last tick's outputs.
    pub fn begin_tick(&mut self, feed: FeedRequest, motor: MotorStatus, fault_active: bool) {
        self.observe_feed(feed);
        self.motor = motor;
        self.fault_active = fault_active;
        self.command = None;
        self.outcome = None;
    }

    /// Fold the feed request into an intent, tracking runs of `Long`.
    /// A one-tick `Long` is only known to be a single pulse on the
    /// following tick, so `Double` lands one tick late.
    pub fn observe_feed(&mut self, feed: FeedRequest) {
        self.feed = feed;
        if self.release_pending {
            self.long_streak = 0;
            self.release_pending = feed.signal != FeedSignal::None;
            self.intent = Intent::None;
            self.hold_dropped = false;
            return;
        }
        self.intent = match feed.signal {
            FeedSignal::Short => {
                self.long_streak = 0;
                Intent::Single(feed.source)
            }
            FeedSignal::Long => {
                self.long_streak = self.long_streak.saturating_add(1);
                self.long_source = feed.source;
                if self.long_streak >= 2 {
                    Intent::Continuous(feed.source)
                } else {
                    Intent::None
                }
            }
            FeedSignal::None => {
                let single = self.long_streak == 1;
                self.long_streak = 0;
                if single {
                    Intent::Double(self.long_source)
                } else {
                    Intent::None
                }
            }
        };
        if !matches!(self.intent, Intent::Continuous(_)) {
            self.hold_dropped = false;
        }
    }

    /// Swallow the rest of the current press after an aborted move.
    pub fn await_release(&mut self) {
        self.release_pending = true;
        self.long_streak = 0;
    }

    /// Record a request that could not be accepted. A held button repeats
    /// its request every tick; that counts once. Returns true when counted.
    pub fn drop_request(&mut self) -> bool {
        let hold = matches!(self.intent, Intent::Continuous(_));
        if hold && self.hold_dropped {
            return false;
        }
        self.hold_dropped = hold;
        self.ignored_requests = self.ignored_requests.saturating_add(1);
        true
    }

    /// Resolve and remember the direction for an accepted move.
    pub fn accept_direction(&mut self, source: FeedSource) -> Direction {
        let base = match self.profile.direction_policy {
            DirectionPolicy::Fixed(direction) => direction,
            DirectionPolicy::Alternate => self.last_feed_direction.reversed(),
        };
        match source {
            FeedSource::Feed => {
                self.last_feed_direction = base;
                base
            }
            FeedSource::Reverse => base.reversed(),
        }
    }

    /// Queue a command for the motor FSM this tick.
    pub fn issue(&mut self, command: MotorCommand) {
        self.command = Some(command);
    }
}

impl StateClock for MotionContext {
    fn set_ticks_in_state(&mut self, ticks: u64) {
        self.ticks_in_state = ticks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(policy: DirectionPolicy) -> MotionContext {
        let mut config = FeederConfig::default();
        config.app.direction_policy = policy;
        MotionContext::new(MoveProfile::from(&config))
    }

    fn req(signal: FeedSignal) -> FeedRequest {
        FeedRequest {
            signal,
            source: FeedSource::Feed,
        }
    }

    #[test]
    fn single_long_pulse_becomes_double_next_tick() {
        let mut c = ctx(DirectionPolicy::Fixed(Direction::Forward));
        c.observe_feed(req(FeedSignal::Long));
        assert_eq!(c.intent, Intent::None);
        c.observe_feed(req(FeedSignal::None));
        assert_eq!(c.intent, Intent::Double(FeedSource::Feed));
        c.observe_feed(req(FeedSignal::None));
        assert_eq!(c.intent, Intent::None);
    }

    #[test]
    fn repeated_long_is_continuous() {
        let mut c = ctx(DirectionPolicy::Fixed(Direction::Forward));
        c.observe_feed(req(FeedSignal::Long));
        c.observe_feed(req(FeedSignal::Long));
        assert_eq!(c.intent, Intent::Continuous(FeedSource::Feed));
        c.observe_feed(req(FeedSignal::Long));
        assert_eq!(c.intent, Intent::Continuous(FeedSource::Feed));
        c.observe_feed(req(FeedSignal::None));
        assert_eq!(c.intent, Intent::None, "end of a hold is not a pulse");
    }

    #[test]
    fn awaiting_release_swallows_rest_of_press() {
        let mut c = ctx(DirectionPolicy::Fixed(Direction::Forward));
        c.observe_feed(req(FeedSignal::Long));
        c.observe_feed(req(FeedSignal::Long));
        c.await_release();
        for _ in 0..5 {
            c.observe_feed(req(FeedSignal::Long));
            assert_eq!(c.intent, Intent::None);
        }
        c.observe_feed(req(FeedSignal::None));
        assert_eq!(c.intent, Intent::None, "release of a swallowed hold is not a pulse");
        assert!(!c.release_pending);

        c.observe_feed(req(FeedSignal::Short));
        assert_eq!(c.intent, Intent::Single(FeedSource::Feed));
    }

    #[test]
    fn held_request_dropped_once() {
        let mut c = ctx(DirectionPolicy::Fixed(Direction::Forward));
        c.observe_feed(req(FeedSignal::Long));
        for _ in 0..10 {
            c.observe_feed(req(FeedSignal::Long));
            c.drop_request();
        }
        assert_eq!(c.ignored_requests, 1);

        c.observe_feed(req(FeedSignal::None));
        c.observe_feed(req(FeedSignal::Short));
        assert!(c.drop_request());
        c.observe_feed(req(FeedSignal::Short));
        assert!(c.drop_request());
        assert_eq!(c.ignored_requests, 3);
    }

    #[test]
    fn short_is_single() {
        let mut c = ctx(DirectionPolicy::Fixed(Direction::Forward));
        c.observe_feed(req(FeedSignal::Short));
        assert_eq!(c.intent, Intent::Single(FeedSource::Feed));
    }

    #[test]
    fn fixed_policy_and_reverse_button() {
        let mut c = ctx(DirectionPolicy::Fixed(Direction::Forward));
        assert_eq!(c.accept_direction(FeedSource::Feed), Direction::Forward);
        assert_eq!(c.accept_direction(FeedSource::Feed), Direction::Forward);
        assert_eq!(c.accept_direction(FeedSource::Reverse), Direction::Backward);
    }

    #[test]
    fn alternate_policy_flips_on_feed_moves_only() {
        let mut c = ctx(DirectionPolicy::Alternate);
        assert_eq!(c.accept_direction(FeedSource::Feed), Direction::Forward);
        assert_eq!(c.accept_direction(FeedSource::Reverse), Direction::Forward);
        assert_eq!(c.accept_direction(FeedSource::Feed), Direction::Backward);
        assert_eq!(c.accept_direction(FeedSource::Feed), Direction::Forward);
    }
}
