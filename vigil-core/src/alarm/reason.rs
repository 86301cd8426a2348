//! Alarm reason taxonomy
//!
//! Reasons are codes, not strings: the notifier and UI collaborators
//! localize them however they like, with [`core::fmt::Display`] providing
//! the default human-readable rendering.

use core::fmt;

/// Why the alarm engine decided to alarm
///
/// Kept small and `Copy`: a verdict is produced on every evaluation and
/// may be queued for a notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlarmReason {
    /// No reading for longer than the configured no-data window
    MissedReadings,
    /// Current value above the high threshold
    HighGlucose,
    /// Current value below the low threshold
    LowGlucose,
    /// Above the high threshold for the whole configured window
    PersistentHigh,
    /// Values rising faster than the configured delta
    FastRise,
    /// Values falling faster than the configured delta
    FastDrop,
    /// Forecast crosses the low threshold within this many minutes
    LowPredicted(u32),
}

impl fmt::Display for AlarmReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissedReadings => write!(f, "Missed readings"),
            Self::HighGlucose => write!(f, "High BG"),
            Self::LowGlucose => write!(f, "Low BG"),
            Self::PersistentHigh => write!(f, "Persistent high BG"),
            Self::FastRise => write!(f, "Fast rise"),
            Self::FastDrop => write!(f, "Fast drop"),
            Self::LowPredicted(minutes) => write!(f, "Low predicted in {minutes} min"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AlarmReason {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::MissedReadings => defmt::write!(fmt, "missed readings"),
            Self::HighGlucose => defmt::write!(fmt, "high BG"),
            Self::LowGlucose => defmt::write!(fmt, "low BG"),
            Self::PersistentHigh => defmt::write!(fmt, "persistent high BG"),
            Self::FastRise => defmt::write!(fmt, "fast rise"),
            Self::FastDrop => defmt::write!(fmt, "fast drop"),
            Self::LowPredicted(minutes) => defmt::write!(fmt, "low predicted in {} min", minutes),
        }
    }
}

/// Outcome of a single alarm evaluation
///
/// `active` and `reason` travel together so a notifier can consume the
/// verdict without re-deriving anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlarmVerdict {
    /// Whether an alarm condition exists right now
    pub active: bool,
    /// The first matching reason, when active
    pub reason: Option<AlarmReason>,
}

impl AlarmVerdict {
    /// A quiet verdict
    pub const INACTIVE: Self = Self {
        active: false,
        reason: None,
    };
}

impl From<Option<AlarmReason>> for AlarmVerdict {
    fn from(reason: Option<AlarmReason>) -> Self {
        Self {
            active: reason.is_some(),
            reason,
        }
    }
}
