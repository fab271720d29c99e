//! # Telegram Bot API Client
//!
//! Thin `reqwest` wrapper over the HTTPS Bot API methods the bot needs.
//!
//! - **Version**: 1.1.1
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.1: HTTP-level tests against a mock Bot API server
//! - 1.1.0: Photo upload via multipart
//! - 1.0.0: getMe, sendMessage, getUpdates

use log::debug;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;
use std::time::Duration;

use super::types::{ApiResponse, Message, Update, User};
use crate::core::file_utils::mime_for_path;
use crate::core::ChannelError;

/// Default timeout for Bot API requests in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    /// `{api_url}/bot{token}`; never logged
    endpoint: String,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self, ChannelError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ChannelError::Http(e.without_url()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.endpoint, method)
    }

    /// POST a JSON body and unwrap the Bot API envelope
    ///
    /// Error statuses still carry a JSON envelope, so the body is decoded
    /// regardless of HTTP status.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, ChannelError> {
        debug!("Telegram API call: {method}");
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.without_url()))?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ChannelError> {
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| ChannelError::Decode(e.without_url().to_string()))?;
        envelope.into_result()
    }

    /// Identify the bot; fails with an API error for a rejected token
    pub async fn get_me(&self) -> Result<User, ChannelError> {
        self.call("getMe", &json!({})).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, ChannelError> {
        self.call("sendMessage", &json!({ "chat_id": chat_id, "text": text }))
            .await
    }

    /// Upload a local image as a photo with a caption
    pub async fn send_photo(
        &self,
        chat_id: i64,
        path: &Path,
        caption: &str,
    ) -> Result<Message, ChannelError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ChannelError::Image {
                path: path.to_path_buf(),
                source,
            })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for_path(path))
            .map_err(|e| ChannelError::Http(e.without_url()))?;

        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("photo", part);

        debug!("Telegram API call: sendPhoto ({})", path.display());
        let response = self
            .http
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.without_url()))?;

        Self::decode(response).await
    }

    /// Fetch pending updates starting at `offset`
    ///
    /// `timeout` is the long-poll duration in seconds; 0 returns immediately.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: u64,
    ) -> Result<Vec<Update>, ChannelError> {
        let mut body = json!({
            "timeout": timeout,
            "allowed_updates": ["message", "channel_post"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", &body).await
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient").finish_non_exhaustive()
    }
}
