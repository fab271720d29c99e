//! # Features Module
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Reminder state machine split into state, schedule and scheduler modules
//! - 1.0.0: Initial reminders and startup features

pub mod reminders;
pub mod startup;

pub use reminders::{ReminderContent, ReminderScheduler, ReminderState, Schedule};
pub use startup::StartupNotifier;

/// Crate version reported in startup logs
pub fn get_bot_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
