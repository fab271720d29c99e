//! # Feature: Startup Notification
//!
//! Sends a test reminder when the bot comes online, so the operator can see
//! the chat, the credential and the image pool all work. Toggled with
//! `STARTUP_NOTIFICATION`.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.1.0: Only the first call per process sends
//! - 1.0.0: Initial release

use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::MessageChannel;
use crate::features::reminders::{ReminderContent, ReminderKind};

/// Handles sending the startup test reminder
pub struct StartupNotifier {
    enabled: bool,
    /// Tracks whether the notification already went out for this process
    first_start: AtomicBool,
}

impl StartupNotifier {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            first_start: AtomicBool::new(true),
        }
    }

    /// Sends the test reminder if enabled and not already sent
    ///
    /// Never touches reminder state: the test message is not a primary reminder.
    /// Returns true if a message was delivered.
    pub async fn send_if_enabled(
        &self,
        channel: &dyn MessageChannel,
        content: &ReminderContent,
    ) -> bool {
        if !self.enabled {
            info!("Startup notifications disabled");
            return false;
        }

        if !self.first_start.swap(false, Ordering::SeqCst) {
            info!("Skipping startup notification (already sent)");
            return false;
        }

        let message = content.compose(ReminderKind::Test).await;
        match channel.send(&message).await {
            Ok(()) => {
                info!("🧪 Test reminder sent");
                true
            }
            Err(e) => {
                warn!("Failed to send startup test reminder: {e}");
                false
            }
        }
    }
}
