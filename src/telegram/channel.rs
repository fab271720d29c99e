//! [`MessageChannel`] over the Telegram Bot API, bound to one chat

use async_trait::async_trait;
use log::debug;
use std::sync::atomic::{AtomicI64, Ordering};

use super::client::TelegramClient;
use super::types::Update;
use crate::core::{
    truncate_for_caption, truncate_for_message, ChannelError, IncomingMessage, MessageChannel,
    OutgoingMessage,
};

/// Offset value meaning "no update confirmed yet"
const NO_OFFSET: i64 = 0;

pub struct TelegramChannel {
    client: TelegramClient,
    chat_id: i64,
    /// Next `update_id` to request; acknowledges everything before it
    offset: AtomicI64,
}

impl TelegramChannel {
    pub fn new(client: TelegramClient, chat_id: i64) -> Self {
        Self {
            client,
            chat_id,
            offset: AtomicI64::new(NO_OFFSET),
        }
    }

    fn current_offset(&self) -> Option<i64> {
        match self.offset.load(Ordering::SeqCst) {
            NO_OFFSET => None,
            offset => Some(offset),
        }
    }

    /// Advance the cursor past `updates` and keep new messages from our chat
    fn absorb(&self, updates: &[Update]) -> Vec<IncomingMessage> {
        if let Some(max_id) = updates.iter().map(|u| u.update_id).max() {
            self.offset.fetch_max(max_id + 1, Ordering::SeqCst);
        }

        updates
            .iter()
            .filter_map(|u| u.new_message())
            .filter_map(|m| m.to_incoming())
            .filter(|m| m.chat_id == self.chat_id)
            .collect()
    }
}

#[async_trait]
impl MessageChannel for TelegramChannel {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), ChannelError> {
        match &message.image {
            Some(path) => {
                self.client
                    .send_photo(self.chat_id, path, &truncate_for_caption(&message.text))
                    .await?;
            }
            None => {
                self.client
                    .send_message(self.chat_id, &truncate_for_message(&message.text))
                    .await?;
            }
        }
        Ok(())
    }

    async fn poll_updates(&self) -> Result<Vec<IncomingMessage>, ChannelError> {
        let updates = self.client.get_updates(self.current_offset(), 0).await?;
        let messages = self.absorb(&updates);
        debug!(
            "Polled {} updates, {} from chat {}",
            updates.len(),
            messages.len(),
            self.chat_id
        );
        Ok(messages)
    }
}
