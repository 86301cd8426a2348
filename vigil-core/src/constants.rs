//! Numeric policy for the alarm engine
//!
//! Every fixed number the decision path depends on lives here with its
//! units in the name. These are empirical properties of CGM sensors and of
//! the alarm rules, not user-configurable tunables; the user-facing knobs
//! live in [`AlarmConfiguration`](crate::alarm::AlarmConfiguration).

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u64 = 60;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: u64 = MS_PER_SECOND * SECONDS_PER_MINUTE;

/// Milliseconds per hour.
pub const MS_PER_HOUR: u64 = MS_PER_MINUTE * 60;

// ===== READING CADENCE =====

/// Nominal interval between CGM readings (minutes).
///
/// Continuous glucose monitors report every 5 minutes. The consecutive-
/// window maths and the edge-detection rate normalization both assume this
/// cadence; see `PERSISTENT_HIGH_COUNT_DIVISOR` before changing it.
pub const READING_INTERVAL_MINUTES: u64 = 5;

/// Slack added to every consecutive-readings window (minutes).
///
/// Readings rarely land exactly on the 5-minute grid; two minutes of
/// jitter tolerance keeps a healthy stream from failing the window check.
pub const CONSECUTIVE_WINDOW_SLACK_MINUTES: u64 = 2;

// ===== READING VALIDITY =====

/// Lowest physically meaningful glucose value (mg/dL).
///
/// Values at or below this are sensor noise or error markers from the
/// data source. They stay in storage but are excluded from trend,
/// forecast, and alarm logic.
pub const GLUCOSE_NOISE_FLOOR_MGDL: f32 = 10.0;

// ===== TREND CLASSIFICATION =====

/// Number of readings a trend classification is computed from.
pub const TREND_WINDOW_READINGS: usize = 3;

/// Single-step delta above which a direction is trusted (mg/dL).
///
/// Empirical noise-floor cutoff; below it one 5-minute step says nothing
/// about direction.
pub const TREND_SINGLE_DELTA_MGDL: f32 = 4.0;

/// Two-step cumulative delta above which a direction is trusted (mg/dL).
pub const TREND_TOTAL_DELTA_MGDL: f32 = 10.0;

// ===== FORECAST =====

/// Length of the per-minute forecast horizon (minutes).
pub const FORECAST_HORIZON_MINUTES: usize = 60;

/// Number of consecutive readings the regression is trained on.
pub const FORECAST_TRAINING_READINGS: usize = 3;

/// Missed-reading tolerance when selecting the training set.
///
/// Looser than the trend tolerance: the regression can still anchor a
/// useful curve across two missed readings, a trend direction cannot.
pub const FORECAST_MAX_MISSED: usize = 2;

/// Points per gapped (5-minute cadence) forecast subsample.
pub const FORECAST_GAPPED_POINTS: usize =
    FORECAST_HORIZON_MINUTES / READING_INTERVAL_MINUTES as usize;

// ===== ALARM RULES =====

/// Smart-snooze recovery horizon (minutes).
///
/// An out-of-range value is suppressed when the forecast re-enters range
/// within this many minutes.
pub const SMART_SNOOZE_RECOVERY_MINUTES: u32 = 30;

/// Largest gap between the two newest readings that edge detection will
/// still reason about (minutes).
///
/// Past this the deceleration check cannot be trusted, and a fast overall
/// pace alarms unconditionally.
pub const EDGE_MAX_PAIR_GAP_MINUTES: f32 = 7.0;

/// Divisor turning a persistent-high window length into a minimum reading
/// count.
///
/// `persistent_high_minutes / 10` assumes the 5-minute reading cadence and
/// tolerates every other reading missing. Re-derive rather than tweak if
/// `READING_INTERVAL_MINUTES` ever changes.
pub const PERSISTENT_HIGH_COUNT_DIVISOR: u32 = 10;

// ===== STORAGE =====

/// Default reading retention (hours).
pub const DEFAULT_RETENTION_HOURS: u64 = 48;

/// Default reading store capacity.
///
/// 48 hours at the 5-minute cadence.
pub const DEFAULT_STORE_CAPACITY: usize = 576;

// ===== UNITS =====

/// mg/dL per mmol/L for glucose (molar mass of glucose / 10).
pub const MGDL_PER_MMOLL: f32 = 18.016;
