//! Bounded reading store
//!
//! ## Overview
//!
//! Holds the recent reading history as a fixed-capacity, ascending-by-
//! timestamp sequence. The data source guarantees ordering and
//! deduplication across sessions; the store only defends those invariants
//! at the ingestion boundary and handles eviction.
//!
//! ## Invariants
//!
//! - Timestamps are strictly ascending; an ingested reading whose
//!   timestamp is not newer than the stored tail is rejected. Feeding the
//!   same live reading twice is therefore a no-op, which is what makes
//!   [`ReadingStore::ingest`] idempotent.
//! - Capacity is fixed at compile time (`heapless::Vec` backing). When
//!   full, the oldest reading is evicted first.
//! - Readings older than the retention window are evicted on ingestion,
//!   measured against the newest stored timestamp so no clock is needed.
//!
//! The backing storage is contiguous rather than a ring so that the
//! windowed queries in [`crate::window`] can borrow suffix slices
//! directly.

use heapless::Vec;

use crate::constants::{DEFAULT_RETENTION_HOURS, DEFAULT_STORE_CAPACITY, MS_PER_HOUR};
use crate::reading::Reading;
use crate::time::Timestamp;

/// Fixed-capacity, time-ordered reading store
///
/// `N` is the maximum number of readings held; the default covers 48
/// hours at the 5-minute CGM cadence.
///
/// Not internally synchronized; wrap in a mutex for concurrent use.
#[derive(Debug, Clone)]
pub struct ReadingStore<const N: usize = DEFAULT_STORE_CAPACITY> {
    readings: Vec<Reading, N>,
    retention_ms: u64,
}

impl<const N: usize> ReadingStore<N> {
    /// Create an empty store with the default 48-hour retention
    pub fn new() -> Self {
        Self {
            readings: Vec::new(),
            retention_ms: DEFAULT_RETENTION_HOURS * MS_PER_HOUR,
        }
    }

    /// Create an empty store keeping `hours` of history
    pub fn with_retention_hours(hours: u64) -> Self {
        Self {
            readings: Vec::new(),
            retention_ms: hours * MS_PER_HOUR,
        }
    }

    /// Ingest a reading, keeping the sequence ordered and deduplicated
    ///
    /// Returns `false` when the reading was rejected because its timestamp
    /// is not strictly newer than the stored tail. Calling this twice with
    /// the same reading yields the same store state as calling it once.
    pub fn ingest(&mut self, reading: Reading) -> bool {
        if let Some(last) = self.readings.last() {
            if reading.timestamp <= last.timestamp {
                return false;
            }
        }

        self.evict_expired(reading.timestamp);

        if self.readings.is_full() {
            self.readings.remove(0);
        }

        // Cannot fail: a slot was freed above if needed
        let _ = self.readings.push(reading);
        true
    }

    /// Merge the current live reading into the store if it is newer
    ///
    /// This is the "latest sequence augmented with the live reading"
    /// operation: idempotent, and a no-op when the live reading is already
    /// the stored tail.
    pub fn ingest_live(&mut self, live: Option<Reading>) -> &[Reading] {
        if let Some(reading) = live {
            self.ingest(reading);
        }
        self.as_slice()
    }

    /// The stored sequence, oldest first
    pub fn as_slice(&self) -> &[Reading] {
        &self.readings
    }

    /// Most recent reading
    pub fn last(&self) -> Option<&Reading> {
        self.readings.last()
    }

    /// Number of stored readings
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Drop all readings
    pub fn clear(&mut self) {
        self.readings.clear();
    }

    fn evict_expired(&mut self, newest: Timestamp) {
        let cutoff = newest.saturating_sub(self.retention_ms);
        while let Some(first) = self.readings.first() {
            if first.timestamp >= cutoff {
                break;
            }
            self.readings.remove(0);
        }
    }
}

impl<const N: usize> Default for ReadingStore<N> {
    fn default() -> Self {
        Self::new()
    }
}
