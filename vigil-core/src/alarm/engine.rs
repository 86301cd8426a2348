//! The alarm decision engine
//!
//! ## Overview
//!
//! One entry point, [`AlarmEngine::evaluate`]: given the reading
//! sequence, a configuration snapshot, and the snooze state, decide
//! whether an alarm condition exists right now and why. The decision is a
//! fixed-order tree (first match wins) re-run from scratch on every
//! call; the forecaster's training cache is the only state carried
//! between calls.
//!
//! ## Decision order
//!
//! 1. Master switch off, or snoozed (unless overridden): quiet.
//! 2. No usable reading yet: quiet, waiting for data.
//! 3. Stale stream: missed-readings alarm if enabled, otherwise quiet.
//!    Trend and forecast derived from stale data cannot be trusted, so
//!    staleness suppresses everything after it.
//! 4. Out of range: smart snooze may suppress a value that is already
//!    recovering; otherwise high (with the persistent-high delay) or low.
//! 5. In range with edge detection on: fast-rise / fast-drop.
//! 6. In range with edge detection off and low prediction on: predicted
//!    low.
//!
//! Steps 4–6 are a strict `else if` chain on the feature toggles, exactly
//! as the rules are defined: an enabled-but-quiet edge detection consumes
//! its turn and the predicted-low rule is not consulted.
//!
//! The engine is not internally synchronized; callers that evaluate from
//! multiple threads wrap it in a mutex.

use crate::alarm::config::AlarmConfiguration;
use crate::alarm::reason::{AlarmReason, AlarmVerdict};
use crate::constants::{
    EDGE_MAX_PAIR_GAP_MINUTES, PERSISTENT_HIGH_COUNT_DIVISOR, READING_INTERVAL_MINUTES,
    SMART_SNOOZE_RECOVERY_MINUTES,
};
use crate::forecast::GlucoseForecaster;
use crate::reading::Reading;
use crate::snooze::SnoozeController;
use crate::time::{minutes_between, Clock, Timestamp};
use crate::window::{last_consecutive, last_minutes, plausible_tail, trend, Trend};

/// Alarm rule engine
///
/// Owns the forecaster and a [`Clock`]; everything else arrives as
/// arguments per evaluation so the caller controls snapshot semantics.
#[derive(Debug, Clone)]
pub struct AlarmEngine<C: Clock> {
    clock: C,
    forecaster: GlucoseForecaster,
}

#[cfg(feature = "std")]
impl AlarmEngine<crate::time::SystemClock> {
    /// Create an engine on the system wall clock
    pub fn new() -> Self {
        Self::with_clock(crate::time::SystemClock)
    }
}

#[cfg(feature = "std")]
impl Default for AlarmEngine<crate::time::SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> AlarmEngine<C> {
    /// Create an engine on an explicit clock
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            forecaster: GlucoseForecaster::new(),
        }
    }

    /// The forecaster backing this engine, for display queries
    pub fn forecaster(&self) -> &GlucoseForecaster {
        &self.forecaster
    }

    /// Decide whether an alarm condition exists right now
    ///
    /// Pure given its inputs and the clock: calling twice at the same
    /// instant with the same arguments yields the same verdict.
    /// `ignore_snooze` lets a caller preview the un-snoozed verdict (UI
    /// badge) without ending the snooze.
    pub fn evaluate(
        &mut self,
        readings: &[Reading],
        config: &AlarmConfiguration,
        snooze: &SnoozeController,
        ignore_snooze: bool,
    ) -> Option<AlarmReason> {
        let now = self.clock.now();

        if config.alerts_disabled {
            return None;
        }
        if snooze.is_snoozed(now) && !ignore_snooze {
            #[cfg(feature = "log")]
            log::trace!("snoozed for {} more min", snooze.remaining_minutes(now));
            return None;
        }

        let readings = plausible_tail(readings);
        let current = match readings.last() {
            Some(reading) => *reading,
            None => return None,
        };

        if current.is_older_than(config.minutes_without_values, now) {
            // Stale data: derived trend and forecast are meaningless, so
            // nothing past this point may fire
            return config.no_data_alarm.then_some(AlarmReason::MissedReadings);
        }

        let too_high = current.value > config.alert_above;
        let too_low = current.value < config.alert_below;

        self.forecaster.update(readings, now);

        let reason = if too_high || too_low {
            if config.smart_snooze && self.recovery_underway(readings, config, too_high, now) {
                None
            } else if too_high {
                self.high_reason(readings, current, config, now)
            } else {
                Some(AlarmReason::LowGlucose)
            }
        } else if config.edge_detection {
            if is_moving_too_fast(readings, config, true) {
                Some(AlarmReason::FastRise)
            } else if is_moving_too_fast(readings, config, false) {
                Some(AlarmReason::FastDrop)
            } else {
                None
            }
        } else if config.low_prediction {
            self.forecaster
                .minutes_to_low(config.alert_below, now)
                .filter(|minutes| *minutes <= config.minutes_to_predict_low)
                .map(AlarmReason::LowPredicted)
        } else {
            None
        };

        #[cfg(feature = "log")]
        if let Some(reason) = reason {
            log::debug!("alarm: {} (current {} mg/dL)", reason, current.value);
        }

        reason
    }

    /// [`Self::evaluate`] packaged as a verdict for notifier collaborators
    pub fn verdict(
        &mut self,
        readings: &[Reading],
        config: &AlarmConfiguration,
        snooze: &SnoozeController,
        ignore_snooze: bool,
    ) -> AlarmVerdict {
        self.evaluate(readings, config, snooze, ignore_snooze).into()
    }

    /// Smart snooze: is the out-of-range value already on its way back?
    ///
    /// Either the short-term trend points back into range, or the
    /// forecast re-enters range within the recovery horizon. Note the
    /// threshold pairing on the forecast checks: a *high* value recovers
    /// by crossing down through `alert_above`, so the high branch asks
    /// `minutes_to_low(alert_above)`, and symmetrically for lows. The
    /// direction pairing is deliberate; do not "fix" it.
    fn recovery_underway(
        &self,
        readings: &[Reading],
        config: &AlarmConfiguration,
        too_high: bool,
        now: Timestamp,
    ) -> bool {
        match trend(readings) {
            Trend::Ascending if !too_high => return true,
            Trend::Descending if too_high => return true,
            _ => {}
        }

        let recovery = if too_high {
            self.forecaster.minutes_to_low(config.alert_above, now)
        } else {
            self.forecaster.minutes_to_high(config.alert_below, now)
        };

        matches!(recovery, Some(minutes) if minutes < SMART_SNOOZE_RECOVERY_MINUTES)
    }

    /// High verdict, possibly delayed by the persistent-high rule
    ///
    /// Below the urgent ceiling, a high only alarms once the whole
    /// configured window has been high, with at least
    /// `persistent_high_minutes / 10` readings present to vouch for it.
    /// At or above the ceiling the delay is bypassed.
    fn high_reason(
        &self,
        readings: &[Reading],
        current: Reading,
        config: &AlarmConfiguration,
        now: Timestamp,
    ) -> Option<AlarmReason> {
        if config.persistent_high && current.value < config.persistent_high_upper_bound {
            let window = last_minutes(readings, config.persistent_high_minutes, now);
            let min_count = (config.persistent_high_minutes / PERSISTENT_HIGH_COUNT_DIVISOR) as usize;

            let sustained = !window.is_empty()
                && window.len() >= min_count
                && window.iter().all(|r| r.value > config.alert_above);

            return sustained.then_some(AlarmReason::PersistentHigh);
        }

        Some(AlarmReason::HighGlucose)
    }
}

/// Rapid rise/drop detection over the recent consecutive window
///
/// Two-tier check: the *overall* pace across the window must reach the
/// configured delta-per-interval, and the *most recent* pair must not
/// have decelerated below half of it: a fast move that is already
/// slowing down is not worth waking anyone for. A gap wider than 7
/// minutes between the newest pair makes deceleration unverifiable and
/// alarms unconditionally.
fn is_moving_too_fast(readings: &[Reading], config: &AlarmConfiguration, increasing: bool) -> bool {
    let window = match last_consecutive(readings, config.consecutive_values, 1) {
        Some(window) if window.len() >= 2 => window,
        _ => return false,
    };

    let alarm_rate_per_minute = config.delta_amount / READING_INTERVAL_MINUTES as f32;
    let direction = if increasing { 1.0 } else { -1.0 };

    let oldest = window[0];
    let newest = window[window.len() - 1];
    let total_minutes = minutes_between(oldest.timestamp, newest.timestamp);
    let total_delta = (newest.value - oldest.value) * direction;

    if total_delta < total_minutes * alarm_rate_per_minute {
        return false;
    }

    let previous = window[window.len() - 2];
    let recent_minutes = minutes_between(previous.timestamp, newest.timestamp);
    if recent_minutes > EDGE_MAX_PAIR_GAP_MINUTES {
        return true;
    }

    let recent_delta = (newest.value - previous.value) * direction;
    if recent_delta < (recent_minutes * alarm_rate_per_minute) / 2.0 {
        return false;
    }

    true
}
