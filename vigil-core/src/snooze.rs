//! Snooze state
//!
//! A snooze is a suppression window: while it lasts, the engine raises no
//! alarm. The controller only tracks the `snoozed until` timestamp; it
//! never decides anything, and the timestamp is externally settable
//! because a remote device may snooze on the user's behalf.
//!
//! Change observation is pull-based: every mutation bumps a generation
//! counter, and the caller re-evaluates when the generation moves. This
//! replaces the change-callback wiring a UI layer would otherwise need.

use crate::constants::{MS_PER_MINUTE, MS_PER_SECOND};
use crate::time::Timestamp;

/// Tracks the user's snooze window
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnoozeController {
    until: Timestamp,
    generation: u32,
}

impl SnoozeController {
    /// Create a controller with no active snooze
    pub fn new() -> Self {
        Self::default()
    }

    /// Snooze for `minutes` from `now`
    pub fn snooze(&mut self, minutes: u32, now: Timestamp) {
        self.set_until(now + minutes as u64 * MS_PER_MINUTE);
    }

    /// Snooze for `seconds` from `now`
    ///
    /// Used at session start: a short transient snooze keeps the engine
    /// quiet until fresh data has a chance to arrive.
    pub fn snooze_seconds(&mut self, seconds: u32, now: Timestamp) {
        self.set_until(now + seconds as u64 * MS_PER_SECOND);
    }

    /// End any active snooze immediately
    pub fn disable(&mut self) {
        self.set_until(0);
    }

    /// Overwrite the snooze timestamp (remote sync writes through here)
    pub fn set_until(&mut self, timestamp: Timestamp) {
        if self.until != timestamp {
            self.until = timestamp;
            self.generation = self.generation.wrapping_add(1);
        }
    }

    /// The instant the current snooze ends
    pub fn until(&self) -> Timestamp {
        self.until
    }

    /// Whether alarms are currently suppressed
    pub fn is_snoozed(&self, now: Timestamp) -> bool {
        now < self.until
    }

    /// Remaining snooze time in whole minutes, rounded up
    pub fn remaining_minutes(&self, now: Timestamp) -> u32 {
        let remaining_ms = self.until.saturating_sub(now);
        remaining_ms.div_ceil(MS_PER_MINUTE) as u32
    }

    /// Mutation counter for pull-based change observation
    pub fn generation(&self) -> u32 {
        self.generation
    }
}
