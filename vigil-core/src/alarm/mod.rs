//! Alarm decision logic
//!
//! The rule engine, its configuration snapshot type, and the reason
//! taxonomy it answers with. Consumers hold an [`AlarmEngine`], feed it
//! the reading sequence plus a fresh [`AlarmConfiguration`] and
//! [`SnoozeController`](crate::snooze::SnoozeController) reference on
//! every evaluation, and hand the resulting verdict to a notifier.

mod config;
mod engine;
mod reason;

pub use config::{AlarmConfiguration, ConfigError};
pub use engine::AlarmEngine;
pub use reason::{AlarmReason, AlarmVerdict};
