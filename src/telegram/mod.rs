//! # Telegram Layer
//!
//! Bot API client and the chat-bound [`crate::core::MessageChannel`] built on it.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

pub mod channel;
pub mod client;
pub mod types;

pub use channel::TelegramChannel;
pub use client::TelegramClient;
