//! # Telegram Bot API Types
//!
//! The subset of Bot API objects the reminder bot reads. Unknown fields are ignored.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::core::{ChannelError, IncomingMessage};

// ============================================================================
// Envelope
// ============================================================================

/// Every Bot API response: `{"ok": true, "result": ...}` or
/// `{"ok": false, "error_code": ..., "description": ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub error_code: Option<i64>,
    pub description: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the envelope into its result or an API error
    pub fn into_result(self) -> Result<T, ChannelError> {
        if !self.ok {
            return Err(ChannelError::Api {
                code: self.error_code.unwrap_or_default(),
                description: self
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        self.result
            .ok_or_else(|| ChannelError::Decode("ok response without result".to_string()))
    }
}

// ============================================================================
// Objects
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

impl User {
    /// `@username` when set, otherwise the first name
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(username) => format!("@{username}"),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Unix time in seconds
    pub date: i64,
    pub chat: Chat,
    /// Absent for channel posts
    pub from: Option<User>,
    pub text: Option<String>,
    pub caption: Option<String>,
    #[serde(default)]
    pub photo: Vec<PhotoSize>,
}

impl Message {
    /// Convert to the transport-neutral form; `None` if the date is out of range
    pub fn to_incoming(&self) -> Option<IncomingMessage> {
        let timestamp = DateTime::from_timestamp(self.date, 0)?;
        Some(IncomingMessage {
            chat_id: self.chat.id,
            sender_is_bot: self.from.as_ref().map(|u| u.is_bot).unwrap_or(false),
            timestamp,
            text: self.text.clone().or_else(|| self.caption.clone()),
            has_photo: !self.photo.is_empty(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub channel_post: Option<Message>,
}

impl Update {
    /// The new message carried by this update, if any
    pub fn new_message(&self) -> Option<&Message> {
        self.message.as_ref().or(self.channel_post.as_ref())
    }
}
