//! # Core Module
//!
//! Configuration, the chat channel seam, and shared Telegram helpers.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Add file_utils for the reminder image pool
//! - 1.1.0: Add channel seam and response size helpers
//! - 1.0.0: Initial creation with config module

pub mod channel;
pub mod config;
pub mod file_utils;
pub mod response;

// Re-export commonly used items
pub use channel::{ChannelError, IncomingMessage, MessageChannel, OutgoingMessage};
pub use config::{AckMode, Config};
pub use response::{truncate_for_caption, truncate_for_message, CAPTION_LIMIT, MESSAGE_LIMIT};
