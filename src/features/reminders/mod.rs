//! # Reminders Feature
//!
//! Daily primary reminder, evening escalation when unanswered, and
//! acknowledgment tracking for a single chat.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod messages;
pub mod schedule;
pub mod scheduler;
pub mod state;

pub use messages::{ReminderContent, ReminderKind};
pub use schedule::Schedule;
pub use scheduler::{ReminderScheduler, TickReport};
pub use state::{ReminderPhase, ReminderState};
