//! Windowed queries over reading sequences
//!
//! ## Overview
//!
//! Pure, total functions over an ascending-by-timestamp reading slice.
//! Empty input yields empty or `None` output, never an error: callers
//! treat "no window" as an ordinary state, because a missing trend must
//! suppress alarms rather than fail them.
//!
//! ## Consecutiveness
//!
//! CGM readings nominally arrive every 5 minutes. A query for the last
//! `count` *consecutive* readings only succeeds when those readings fit
//! inside `(count + max_missed) * 5 + 2` minutes: up to `max_missed` gaps
//! in the stream are tolerated, plus two minutes of grid jitter. Anything
//! wider would let stale data masquerade as a trend.

use crate::constants::{
    CONSECUTIVE_WINDOW_SLACK_MINUTES, MS_PER_MINUTE, READING_INTERVAL_MINUTES,
    TREND_SINGLE_DELTA_MGDL, TREND_TOTAL_DELTA_MGDL, TREND_WINDOW_READINGS,
};
use crate::reading::Reading;
use crate::time::Timestamp;

/// Short-term directional classification of the glucose curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Trend {
    /// Values are rising
    Ascending,
    /// Values are falling
    Descending,
    /// Too little or too noisy data to call a direction
    Unknown,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Trend {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Ascending => defmt::write!(fmt, "ascending"),
            Self::Descending => defmt::write!(fmt, "descending"),
            Self::Unknown => defmt::write!(fmt, "unknown"),
        }
    }
}

/// Suffix of readings whose timestamps lie within `minutes` of `now`
///
/// Order is preserved; an empty slice means nothing recent enough.
pub fn last_minutes(readings: &[Reading], minutes: u32, now: Timestamp) -> &[Reading] {
    let cutoff = now.saturating_sub(minutes as u64 * MS_PER_MINUTE);
    let start = readings.partition_point(|r| r.timestamp < cutoff);
    &readings[start..]
}

/// Exactly the `count` newest readings, if they are consecutive
///
/// Returns `None` when fewer than `count` readings exist or when the
/// newest `count` span more than `(count + max_missed) * 5 + 2` minutes.
/// Never returns a partial window.
pub fn last_consecutive(
    readings: &[Reading],
    count: usize,
    max_missed: usize,
) -> Option<&[Reading]> {
    if count == 0 || readings.len() < count {
        return None;
    }

    let window = &readings[readings.len() - count..];
    let span = window[count - 1].timestamp.saturating_sub(window[0].timestamp);
    let limit_minutes =
        (count + max_missed) as u64 * READING_INTERVAL_MINUTES + CONSECUTIVE_WINDOW_SLACK_MINUTES;

    if span <= limit_minutes * MS_PER_MINUTE {
        Some(window)
    } else {
        None
    }
}

/// Pairwise consecutive value differences, oldest pair first
///
/// Yields `readings.len() - 1` values (zero for empty or single-element
/// input).
pub fn deltas(readings: &[Reading]) -> impl Iterator<Item = f32> + '_ {
    readings.windows(2).map(|pair| pair[1].value - pair[0].value)
}

/// Suffix of readings after the most recent implausible one
///
/// An implausible reading (noise-floor or non-finite value) breaks
/// consecutiveness for everything before it, so trend and forecast logic
/// operate on this tail only. Storage keeps the full sequence.
pub fn plausible_tail(readings: &[Reading]) -> &[Reading] {
    let start = readings
        .iter()
        .rposition(|r| !r.is_plausible())
        .map(|i| i + 1)
        .unwrap_or(0);
    &readings[start..]
}

/// Directional classification from the last three consecutive readings
///
/// The two deltas `d0, d1` (in mg/dL) decide the call: a direction is
/// trusted only when `|d1| > 4` or `|d0 + d1| > 10`, the empirical noise
/// floors of one and two 5-minute steps. The sign of `d1` gives the
/// direction. Anything else, including an unavailable consecutive
/// window, is [`Trend::Unknown`].
pub fn trend(readings: &[Reading]) -> Trend {
    let tail = plausible_tail(readings);
    let window = match last_consecutive(tail, TREND_WINDOW_READINGS, 1) {
        Some(window) => window,
        None => return Trend::Unknown,
    };

    let d0 = window[1].value - window[0].value;
    let d1 = window[2].value - window[1].value;

    if d1.abs() > TREND_SINGLE_DELTA_MGDL || (d0 + d1).abs() > TREND_TOTAL_DELTA_MGDL {
        if d1 > 0.0 {
            Trend::Ascending
        } else if d1 < 0.0 {
            Trend::Descending
        } else {
            Trend::Unknown
        }
    } else {
        Trend::Unknown
    }
}
