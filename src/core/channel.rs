//! Message channel trait and transport-neutral message types
//!
//! The reminder scheduler only talks to the chat through [`MessageChannel`],
//! so it can be driven by an in-memory double in tests.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: `ChannelError::may_be_attachment` for the text-only fallback
//! - 1.0.0: Initial channel seam

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// A message the bot wants to deliver to its chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    /// Local image file attached as a photo, with `text` as its caption
    pub image: Option<PathBuf>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(text: impl Into<String>, image: Option<PathBuf>) -> Self {
        Self {
            text: text.into(),
            image,
        }
    }
}

/// A message observed in a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub sender_is_bot: bool,
    pub timestamp: DateTime<Utc>,
    pub text: Option<String>,
    pub has_photo: bool,
}

/// Failures reported by a message channel
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The messaging API answered but rejected the request
    #[error("API error {code}: {description}")]
    Api { code: i64, description: String },

    /// The image attachment could not be read
    #[error("Failed to read image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The response body did not match the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ChannelError {
    /// Whether resending without the attachment could succeed
    ///
    /// An unreadable file or an API rejection (e.g. a corrupt photo) may be
    /// specific to the image; transport and decode failures are not.
    pub fn may_be_attachment(&self) -> bool {
        matches!(self, ChannelError::Image { .. } | ChannelError::Api { .. })
    }
}

/// Send/receive primitives against a single chat
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Deliver a message; `Ok` only once the platform confirmed it
    async fn send(&self, message: &OutgoingMessage) -> Result<(), ChannelError>;

    /// Fetch messages that arrived since the previous poll
    ///
    /// Every call resumes where the last successful one stopped, so a message is
    /// yielded at most once.
    async fn poll_updates(&self) -> Result<Vec<IncomingMessage>, ChannelError>;
}
