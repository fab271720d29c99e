//! # Startup Notification Feature
//!
//! Test reminder sent once when the bot comes online.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: true

pub mod notification;

pub use notification::StartupNotifier;
