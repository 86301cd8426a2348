//! Clock abstraction for the decision engine
//!
//! Every time-dependent query in this crate (windowing, staleness, snooze
//! arithmetic, forecast offsets) takes its notion of "now" from a [`Clock`]
//! rather than reading the system time directly. This keeps the whole
//! decision path deterministic under test and lets the same core run on
//! hosts without a wall clock.

use crate::constants::MS_PER_MINUTE;

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Source of the current time
pub trait Clock {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// System wall clock (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Fixed clock for testing
///
/// Starts at a given timestamp and only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: Timestamp,
}

impl FixedClock {
    /// Create a clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Move the clock to an absolute timestamp
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Advance the clock by `ms` milliseconds
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }

    /// Advance the clock by whole minutes
    pub fn advance_minutes(&mut self, minutes: u64) {
        self.timestamp += minutes * MS_PER_MINUTE;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// A `Cell` is a clock that can be moved while shared
///
/// Handy in tests: the engine borrows the cell while the test advances
/// it between evaluations.
impl Clock for core::cell::Cell<Timestamp> {
    fn now(&self) -> Timestamp {
        self.get()
    }
}

impl Clock for &core::cell::Cell<Timestamp> {
    fn now(&self) -> Timestamp {
        self.get()
    }
}

/// Elapsed minutes between two timestamps, fractional
///
/// Saturates to zero when `later` precedes `earlier`; the caller never has
/// to care about clock adjustments producing negative spans.
pub fn minutes_between(earlier: Timestamp, later: Timestamp) -> f32 {
    later.saturating_sub(earlier) as f32 / MS_PER_MINUTE as f32
}

/// Elapsed whole minutes between two timestamps, truncated
pub fn whole_minutes_between(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier) / MS_PER_MINUTE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = FixedClock::new(1000);
        assert_eq!(clock.now(), 1000);

        clock.advance(500);
        assert_eq!(clock.now(), 1500);

        clock.advance_minutes(2);
        assert_eq!(clock.now(), 1500 + 2 * MS_PER_MINUTE);
    }

    #[test]
    fn minute_spans() {
        assert_eq!(minutes_between(0, 90_000), 1.5);
        assert_eq!(whole_minutes_between(0, 90_000), 1);

        // Backwards spans saturate instead of wrapping
        assert_eq!(minutes_between(90_000, 0), 0.0);
        assert_eq!(whole_minutes_between(90_000, 0), 0);
    }
}
