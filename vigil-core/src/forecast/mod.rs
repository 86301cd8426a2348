//! Short-term glucose forecast
//!
//! ## Overview
//!
//! Fits a small polynomial regression to the most recent consecutive
//! readings and projects the curve forward minute-by-minute for an hour.
//! The forecast feeds two alarm paths (smart-snooze recovery and the
//! low-prediction alarm) and one display path (the gapped subsample).
//!
//! "No forecast" is an ordinary state, not an error: with no valid
//! training window the horizon is simply empty and every derived query
//! answers `None`.
//!
//! ## Training Window
//!
//! The training set is the last 3 consecutive plausible readings with up
//! to 2 missed readings tolerated. Looser than the trend window, because
//! a regression can still anchor a useful curve across a gap. The fitting
//! itself lives in [`polyfit`].
//!
//! ## Retraining
//!
//! The forecaster refits only when the training window actually changes
//! (value + timestamp equality against the cached window). This is an
//! optimization, not a correctness requirement, but it also pins the
//! forecast anchor: derived queries measure elapsed time against the
//! anchor so a verdict asked for twice at the same instant is identical.

mod polyfit;

use heapless::Vec;

use crate::constants::{
    FORECAST_GAPPED_POINTS, FORECAST_HORIZON_MINUTES, FORECAST_MAX_MISSED,
    FORECAST_TRAINING_READINGS, MS_PER_MINUTE, MS_PER_SECOND, READING_INTERVAL_MINUTES,
};
use crate::reading::Reading;
use crate::time::{whole_minutes_between, Timestamp};
use crate::window::{last_consecutive, plausible_tail};

use polyfit::PolyFit;

/// One forecast value, one minute apart from its neighbors
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PredictionPoint {
    /// Predicted glucose in mg/dL, rounded to the nearest integer
    pub value: f32,
    /// Minute this prediction is for, milliseconds since epoch
    pub timestamp: Timestamp,
}

/// Per-minute regression forecast over the next hour
///
/// Holds the only inter-call state of the decision core: the cached
/// training window and the points fitted from it. Not internally
/// synchronized; wrap the owning engine in a mutex for concurrent use.
#[derive(Debug, Clone, Default)]
pub struct GlucoseForecaster {
    trained_on: Vec<Reading, FORECAST_TRAINING_READINGS>,
    points: Vec<PredictionPoint, FORECAST_HORIZON_MINUTES>,
    /// Instant the current horizon was computed at
    anchor: Timestamp,
    /// Newest training reading, the phase reference for the gapped view
    reference: Option<Reading>,
}

impl GlucoseForecaster {
    /// Create a forecaster with an empty horizon
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the forecast from the reading sequence
    ///
    /// Selects the training window, refits if it changed, and clears the
    /// horizon when no valid window exists (the cleared state then
    /// persists until a valid window appears).
    pub fn update(&mut self, readings: &[Reading], now: Timestamp) {
        let tail = plausible_tail(readings);
        let window =
            match last_consecutive(tail, FORECAST_TRAINING_READINGS, FORECAST_MAX_MISSED) {
                Some(window) => window,
                None => {
                    self.trained_on.clear();
                    self.points.clear();
                    self.reference = None;
                    return;
                }
            };

        if self.trained_on.as_slice() == window {
            return;
        }

        self.trained_on.clear();
        let _ = self.trained_on.extend_from_slice(window);
        self.reference = window.last().copied();
        self.refit(now);
    }

    /// Convenience: refresh and borrow the raw horizon in one call
    pub fn predict(&mut self, readings: &[Reading], now: Timestamp) -> &[PredictionPoint] {
        self.update(readings, now);
        self.next_hour()
    }

    /// The raw horizon: 60 points, one per future minute from the anchor
    ///
    /// Empty when no valid training window exists.
    pub fn next_hour(&self) -> &[PredictionPoint] {
        &self.points
    }

    /// Whether the forecaster currently has no horizon
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Minutes until the forecast first reaches or falls below `threshold`
    ///
    /// `Some(0)` when the next minute is already at or below it; `None`
    /// when no point in the remaining horizon crosses. Elapsed whole
    /// minutes since the anchor shift the horizon so a stale forecast
    /// still answers in minutes-from-now.
    pub fn minutes_to_low(&self, threshold: f32, now: Timestamp) -> Option<u32> {
        self.minutes_to(now, |value| value <= threshold)
    }

    /// Minutes until the forecast first reaches or exceeds `threshold`
    pub fn minutes_to_high(&self, threshold: f32, now: Timestamp) -> Option<u32> {
        self.minutes_to(now, |value| value >= threshold)
    }

    /// Forecast subsampled to the 5-minute reading cadence
    ///
    /// Display continuity: the subsample is phase-anchored so its points
    /// land on the grid the real readings arrive on, starting at index
    /// `(5 - offset) % 5` where `offset` is the reference reading's age in
    /// minutes modulo 5. The alarm paths use [`Self::next_hour`] only.
    pub fn next_hour_gapped(&self) -> Vec<PredictionPoint, FORECAST_GAPPED_POINTS> {
        let mut gapped = Vec::new();

        let offset = match self.reference {
            Some(reference) => {
                whole_minutes_between(reference.timestamp, self.anchor)
                    % READING_INTERVAL_MINUTES
            }
            None => return gapped,
        };
        let start = ((READING_INTERVAL_MINUTES - offset) % READING_INTERVAL_MINUTES) as usize;

        for point in self.points.iter().skip(start).step_by(READING_INTERVAL_MINUTES as usize) {
            let _ = gapped.push(*point);
        }
        gapped
    }

    fn minutes_to(&self, now: Timestamp, crosses: impl Fn(f32) -> bool) -> Option<u32> {
        let elapsed = whole_minutes_between(self.anchor, now) as usize;
        if elapsed >= self.points.len() {
            return None;
        }

        for (i, point) in self.points[elapsed..].iter().enumerate() {
            if crosses(point.value) {
                return Some(if i == 0 { 0 } else { i as u32 + 1 });
            }
        }
        None
    }

    fn refit(&mut self, now: Timestamp) {
        self.points.clear();
        self.anchor = now;

        let mut samples = [(0.0f64, 0.0f64); FORECAST_TRAINING_READINGS];
        let samples = &mut samples[..self.trained_on.len()];
        for (slot, reading) in samples.iter_mut().zip(self.trained_on.iter()) {
            *slot = (
                (reading.timestamp / MS_PER_SECOND) as f64,
                reading.value as f64,
            );
        }

        let fit = match PolyFit::fit(samples) {
            Some(fit) => fit,
            None => return,
        };

        #[cfg(feature = "log")]
        log::debug!(
            "forecast retrained on {} readings, anchor {}",
            self.trained_on.len(),
            self.anchor
        );

        let now_seconds = now / MS_PER_SECOND;
        for minute in 1..=FORECAST_HORIZON_MINUTES as u64 {
            let t = (now_seconds + minute * 60) as f64;
            let value = libm::round(fit.predict(t)) as f32;
            let _ = self.points.push(PredictionPoint {
                value,
                timestamp: now + minute * MS_PER_MINUTE,
            });
        }
    }
}
