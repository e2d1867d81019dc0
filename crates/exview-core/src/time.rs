//! Time Management
//!
//! Minimum-interval throttling for work that runs on every cursor move but only
//! needs refreshing a few times per second.
//!
//! Callers pass `Instant`s in explicitly so the gate is deterministic under
//! test.

use std::time::{Duration, Instant};

/// Gate that opens at most once per `interval`
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_fired: Option<Instant>,
}

impl Throttle {
    /// Create a throttle with the given minimum interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
        }
    }

    /// Minimum interval between firings
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the interval; the last firing time is kept
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Whether the gate would open at `now`
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Open the gate if the interval has elapsed, recording `now` as the
    /// firing time. Returns whether it opened.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if self.is_ready(now) {
            self.last_fired = Some(now);
            true
        } else {
            false
        }
    }

    /// Forget the last firing so the next call opens immediately
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}
