//! Decision core for Vigil
//!
//! Polls nothing, renders nothing: this crate is the alarm decision
//! engine and short-term trend forecaster of a glucose-monitoring
//! companion. Collaborators feed it a time-ordered reading sequence, a
//! configuration snapshot, and the snooze state; it answers with an alarm
//! verdict and a reason.
//!
//! Key constraints:
//! - All decision-path functions are total: `Option`/empty outputs,
//!   never panics
//! - No I/O, no timers: "now" comes from an injected [`Clock`]
//! - no-std capable for watch-class hardware; no heap in the decision path
//!
//! ```no_run
//! use vigil_core::{AlarmConfiguration, AlarmEngine, Reading, ReadingStore, SnoozeController};
//!
//! let mut store: ReadingStore = ReadingStore::new();
//! store.ingest(Reading::new(104.0, 1_700_000_000_000));
//!
//! let config = AlarmConfiguration::default().with_thresholds(180.0, 80.0);
//! let snooze = SnoozeController::new();
//! let mut engine = AlarmEngine::new();
//!
//! // Re-run on every new reading or config change
//! match engine.evaluate(store.as_slice(), &config, &snooze, false) {
//!     Some(reason) => println!("ALARM: {reason}"),
//!     None => {} // all quiet
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod alarm;
pub mod constants;
pub mod forecast;
pub mod reading;
pub mod snooze;
pub mod store;
pub mod time;
pub mod units;
pub mod window;

// Public API
pub use alarm::{AlarmConfiguration, AlarmEngine, AlarmReason, AlarmVerdict, ConfigError};
pub use forecast::{GlucoseForecaster, PredictionPoint};
pub use reading::Reading;
pub use snooze::SnoozeController;
pub use store::ReadingStore;
pub use time::{Clock, FixedClock, Timestamp};
pub use window::{deltas, last_consecutive, last_minutes, trend, Trend};

#[cfg(feature = "std")]
pub use time::SystemClock;

/// Crate version, for collaborators that report it
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
