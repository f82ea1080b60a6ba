//! Autoplay scheduling for idle advancement.
//!
//! ## Usage
//!
//! The engine owns one [`Autoplay`] and consults it from its `tick`
//! entry point; hosts never touch this type directly. Deadlines are
//! evaluated against a caller-supplied instant so firing stays
//! serialized with every other engine call.

use std::time::{Duration, Instant};

/// Deadline-based periodic trigger for automatic advancement.
///
/// A zero interval disables the trigger entirely; no deadline exists
/// until a positive interval is armed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Autoplay {
    interval: Duration,
    next_fire: Option<Instant>,
}

impl Autoplay {
    /// Creates a disabled trigger.
    pub fn new() -> Self {
        Self::with_interval(Duration::ZERO)
    }

    /// Creates an unscheduled trigger with the given interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            next_fire: None,
        }
    }

    /// Returns the configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a deadline is currently pending.
    pub fn is_scheduled(&self) -> bool {
        self.next_fire.is_some()
    }

    /// Replaces the interval, always cancelling any pending deadline and
    /// re-arming only for a positive interval on an attached engine.
    pub fn set_interval(&mut self, interval: Duration, now: Instant, attached: bool) {
        self.interval = interval;
        self.next_fire = None;
        if !interval.is_zero() && attached {
            self.next_fire = Some(now + interval);
        }
    }

    /// Schedules the next deadline unless one is already pending or the
    /// interval is zero.
    pub fn arm(&mut self, now: Instant) {
        if self.next_fire.is_some() || self.interval.is_zero() {
            return;
        }
        self.next_fire = Some(now + self.interval);
    }

    /// Drops any pending deadline.
    pub fn cancel(&mut self) {
        self.next_fire = None;
    }

    /// Consumes a due deadline, rescheduling the next one.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.next_fire {
            Some(deadline) if now >= deadline => {
                self.next_fire = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

impl Default for Autoplay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::Autoplay;

    const INTERVAL: Duration = Duration::from_secs(3);

    #[test]
    fn zero_interval_never_schedules() {
        let mut autoplay = Autoplay::new();
        let now = Instant::now();
        autoplay.arm(now);
        assert!(!autoplay.is_scheduled());
        autoplay.set_interval(Duration::ZERO, now, true);
        assert!(!autoplay.is_scheduled());
        assert!(!autoplay.fire_if_due(now + Duration::from_secs(60)));
    }

    #[test]
    fn fire_consumes_and_reschedules() {
        let mut autoplay = Autoplay::with_interval(INTERVAL);
        let now = Instant::now();
        autoplay.arm(now);
        assert!(!autoplay.fire_if_due(now + Duration::from_secs(2)));
        assert!(autoplay.fire_if_due(now + INTERVAL));
        // The next deadline counts from the fire instant.
        assert!(!autoplay.fire_if_due(now + INTERVAL + Duration::from_secs(2)));
        assert!(autoplay.fire_if_due(now + INTERVAL + INTERVAL));
    }

    #[test]
    fn arm_keeps_an_existing_deadline() {
        let mut autoplay = Autoplay::with_interval(INTERVAL);
        let now = Instant::now();
        autoplay.arm(now);
        autoplay.arm(now + Duration::from_secs(2));
        assert!(autoplay.fire_if_due(now + INTERVAL));
    }

    #[test]
    fn set_interval_cancels_before_rearming() {
        let mut autoplay = Autoplay::with_interval(INTERVAL);
        let now = Instant::now();
        autoplay.arm(now);
        autoplay.set_interval(Duration::from_secs(10), now, true);
        assert!(!autoplay.fire_if_due(now + INTERVAL));
        assert!(autoplay.fire_if_due(now + Duration::from_secs(10)));

        autoplay.set_interval(Duration::from_secs(10), now, false);
        assert!(!autoplay.is_scheduled());
    }

    #[test]
    fn cancel_drops_the_deadline() {
        let mut autoplay = Autoplay::with_interval(INTERVAL);
        let now = Instant::now();
        autoplay.arm(now);
        autoplay.cancel();
        assert!(!autoplay.fire_if_due(now + INTERVAL));
    }
}
