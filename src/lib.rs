// Core layer - configuration, channel seam and shared helpers
pub mod core;

// Features layer - reminder state machine and startup notification
pub mod features;

// Transport layer - Telegram Bot API
pub mod telegram;

pub use crate::core::Config;

pub use features::{ReminderContent, ReminderScheduler, ReminderState, Schedule, StartupNotifier};

pub use telegram::{TelegramChannel, TelegramClient};
