//! User-facing alarm configuration
//!
//! A configuration is a read-only snapshot: the surrounding config store
//! owns mutation and cross-device sync, and hands the engine a value per
//! evaluation. Thresholds are mg/dL, like everything else in the core.

use thiserror_no_std::Error;

/// Tunable knobs and feature toggles for the alarm engine
///
/// Defaults follow common CGM companion settings; every threshold-style
/// field has a `with_*` builder for the config store to layer user
/// preferences on top.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlarmConfiguration {
    /// Master switch: when set, no alarm is ever raised
    pub alerts_disabled: bool,

    /// Alarm when the current value exceeds this (mg/dL)
    pub alert_above: f32,
    /// Alarm when the current value falls below this (mg/dL)
    pub alert_below: f32,

    /// Suppress alarms that the trend or forecast says will self-correct
    pub smart_snooze: bool,
    /// Raise fast-rise / fast-drop alarms
    pub edge_detection: bool,
    /// Delay high alarms until the high has lasted a while
    pub persistent_high: bool,
    /// Raise an alarm when a low is predicted
    pub low_prediction: bool,
    /// Raise an alarm when readings stop arriving
    pub no_data_alarm: bool,

    /// Readings inspected by edge detection
    pub consecutive_values: usize,
    /// Value change per reading interval that counts as "too fast" (mg/dL)
    pub delta_amount: f32,
    /// Minutes without readings before the stream counts as stale
    pub minutes_without_values: u32,
    /// Predicted-low lead time that triggers the low-prediction alarm
    pub minutes_to_predict_low: u32,
    /// How long a high must last to count as persistent (minutes)
    pub persistent_high_minutes: u32,
    /// Ceiling above which a high alarms immediately, persistence or not (mg/dL)
    pub persistent_high_upper_bound: f32,
}

impl Default for AlarmConfiguration {
    fn default() -> Self {
        Self {
            alerts_disabled: false,
            alert_above: 180.0,
            alert_below: 80.0,
            smart_snooze: false,
            edge_detection: false,
            persistent_high: false,
            low_prediction: true,
            no_data_alarm: true,
            consecutive_values: 3,
            delta_amount: 8.0,
            minutes_without_values: 15,
            minutes_to_predict_low: 15,
            persistent_high_minutes: 30,
            persistent_high_upper_bound: 250.0,
        }
    }
}

impl AlarmConfiguration {
    /// Set both alert thresholds (mg/dL)
    pub fn with_thresholds(mut self, above: f32, below: f32) -> Self {
        self.alert_above = above;
        self.alert_below = below;
        self
    }

    /// Toggle smart snooze
    pub fn with_smart_snooze(mut self, enabled: bool) -> Self {
        self.smart_snooze = enabled;
        self
    }

    /// Toggle edge detection with its window and delta
    pub fn with_edge_detection(mut self, consecutive_values: usize, delta_amount: f32) -> Self {
        self.edge_detection = true;
        self.consecutive_values = consecutive_values;
        self.delta_amount = delta_amount;
        self
    }

    /// Toggle the persistent-high delay with its window and ceiling
    pub fn with_persistent_high(mut self, minutes: u32, upper_bound: f32) -> Self {
        self.persistent_high = true;
        self.persistent_high_minutes = minutes;
        self.persistent_high_upper_bound = upper_bound;
        self
    }

    /// Toggle the low-prediction alarm with its lead time
    pub fn with_low_prediction(mut self, minutes: u32) -> Self {
        self.low_prediction = true;
        self.minutes_to_predict_low = minutes;
        self
    }

    /// Sanity-check the snapshot before handing it to the engine
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("alert_above", self.alert_above),
            ("alert_below", self.alert_below),
            ("delta_amount", self.delta_amount),
            ("persistent_high_upper_bound", self.persistent_high_upper_bound),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteValue { name });
            }
        }

        if self.alert_above <= self.alert_below {
            return Err(ConfigError::InvertedThresholds {
                above: self.alert_above,
                below: self.alert_below,
            });
        }

        for (name, value) in [
            ("consecutive_values", self.consecutive_values as u64),
            ("minutes_without_values", self.minutes_without_values as u64),
            ("minutes_to_predict_low", self.minutes_to_predict_low as u64),
            ("persistent_high_minutes", self.persistent_high_minutes as u64),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroTunable { name });
            }
        }

        Ok(())
    }
}

/// Rejection reasons from [`AlarmConfiguration::validate`]
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A threshold is NaN or infinite
    #[error("{name} is not a finite number")]
    NonFiniteValue {
        /// Offending field
        name: &'static str,
    },

    /// The high threshold does not exceed the low one
    #[error("high threshold {above} does not exceed low threshold {below}")]
    InvertedThresholds {
        /// Configured high threshold
        above: f32,
        /// Configured low threshold
        below: f32,
    },

    /// A count or duration tunable is zero
    #[error("{name} must be greater than zero")]
    ZeroTunable {
        /// Offending field
        name: &'static str,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NonFiniteValue { name } => defmt::write!(fmt, "{} not finite", name),
            Self::InvertedThresholds { above, below } => {
                defmt::write!(fmt, "thresholds inverted: {} <= {}", above, below)
            }
            Self::ZeroTunable { name } => defmt::write!(fmt, "{} is zero", name),
        }
    }
}
