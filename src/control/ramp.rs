//! Trapezoidal speed profile for the phase accumulator.
//!
//! Speed starts at `start_speed`, climbs by `ramp_rate` each tick up to the
//! commanded cruise speed and, for distance moves, falls back towards
//! `start_speed` once the remaining distance is inside the stopping
//! distance. The final advance is clamped so a distance move lands exactly
//! on its target.

/// Per-move speed state. Units are phase units and phase units per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeedProfile {
    speed: u32,
    cruise: u32,
    start: u32,
    ramp: u32,
    /// `None` while free-running.
    remaining: Option<u32>,
    travelled: u64,
}

impl SpeedProfile {
    /// Begin a new move. `distance = None` runs until stopped.
    pub fn begin(cruise: u32, start: u32, ramp: u32, distance: Option<u32>) -> Self {
        let start = start.max(1).min(cruise.max(1));
        Self {
            speed: start,
            cruise: cruise.max(start),
            start,
            ramp: ramp.max(1),
            remaining: distance,
            travelled: 0,
        }
    }

    /// Units to advance this tick, after applying the ramp.
    pub fn advance(&mut self) -> u32 {
        if self.is_finished() {
            return 0;
        }

        let decelerate = matches!(self.remaining, Some(rem) if u64::from(rem) <= self.stopping_distance());
        self.speed = if decelerate {
            self.speed.saturating_sub(self.ramp).max(self.start)
        } else {
            self.speed.saturating_add(self.ramp).min(self.cruise)
        };

        let step = match self.remaining {
            Some(rem) => {
                let step = self.speed.min(rem);
                self.remaining = Some(rem - step);
                step
            }
            None => self.speed,
        };
        self.travelled += u64::from(step);
        step
    }

    /// Distance covered while ramping from the current speed down to
    /// `start` at `ramp` per tick.
    pub fn stopping_distance(&self) -> u64 {
        let excess = u64::from(self.speed.saturating_sub(self.start));
        let ramp = u64::from(self.ramp);
        let n = excess / ramp;
        // sum_{k=1..n} (speed - k * ramp)
        n * u64::from(self.speed) - ramp * n * (n + 1) / 2
    }

    /// True once a distance move has covered its full distance.
    pub fn is_finished(&self) -> bool {
        self.remaining == Some(0)
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn travelled(&self) -> u64 {
        self.travelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_end(p: &mut SpeedProfile) -> u32 {
        let mut ticks = 0;
        while !p.is_finished() {
            let step = p.advance();
            assert!(step > 0, "profile stalled at tick {ticks}");
            ticks += 1;
            assert!(ticks < 1_000_000);
        }
        ticks
    }

    #[test]
    fn distance_move_lands_exactly() {
        let mut p = SpeedProfile::begin(640, 64, 8, Some(65_536));
        run_to_end(&mut p);
        assert_eq!(p.travelled(), 65_536);
        assert_eq!(p.remaining(), Some(0));
    }

    #[test]
    fn ramps_up_by_rate_and_caps_at_cruise() {
        let mut p = SpeedProfile::begin(100, 10, 30, None);
        assert_eq!(p.advance(), 40);
        assert_eq!(p.advance(), 70);
        assert_eq!(p.advance(), 100);
        assert_eq!(p.advance(), 100);
    }

    #[test]
    fn decelerates_before_target() {
        let mut p = SpeedProfile::begin(640, 64, 8, Some(200_000));
        let mut peak = 0;
        let mut last = 0;
        while !p.is_finished() {
            last = p.advance();
            peak = peak.max(p.speed());
        }
        assert_eq!(peak, 640);
        assert!(last <= 64 + 2 * 8, "final step {last} should be near start speed");
    }

    #[test]
    fn free_run_never_finishes() {
        let mut p = SpeedProfile::begin(1280, 64, 8, None);
        for _ in 0..10_000 {
            assert!(p.advance() > 0);
        }
        assert!(!p.is_finished());
    }

    #[test]
    fn tiny_distance_single_tick() {
        let mut p = SpeedProfile::begin(640, 64, 8, Some(5));
        assert_eq!(p.advance(), 5);
        assert!(p.is_finished());
        assert_eq!(p.advance(), 0);
    }

    #[test]
    fn stopping_distance_at_start_speed_is_zero() {
        let p = SpeedProfile::begin(640, 64, 8, Some(1000));
        assert_eq!(p.stopping_distance(), 0);
    }
}
