//! Reminder texts and attachment selection
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: `compose` is async, the image pool is scanned with tokio::fs
//! - 1.1.0: Rotating image pool read from a directory instead of a fixed file list
//! - 1.0.0: Initial message pools

use rand::seq::IndexedRandom;
use std::path::PathBuf;

use crate::core::file_utils::list_images;
use crate::core::OutgoingMessage;

pub const REMINDER_MESSAGES: &[&str] = &[
    "Time for your Anki flashcards! 📚✨",
    "Hey! Don't forget your daily Anki practice! 🧠💪",
    "Anki time! Let's strengthen that memory! 🎯",
    "Your brain is waiting for some Anki love! 💝📖",
    "Daily Anki reminder: Knowledge is power! ⚡📚",
    "Ready to boost your brain? Anki awaits! 🚀🧠",
    "Don't let your neurons get lazy! Anki time! ⚡📖",
    "Consistency is the key to mastery! Time for Anki! 🔑",
    "Level up your knowledge with today's Anki session! 🎮",
    "Your future self will thank you for this Anki session! 🙏",
];

pub const FOLLOWUP_MESSAGES: &[&str] = &[
    "Still waiting for your Anki screenshot! Don't give up! 💪",
    "Hey, did you forget about Anki? It's not too late! ⏰",
    "Your brain is still waiting for that Anki session! 🧠❤️",
    "Gentle reminder: Anki flashcards are still pending! 📚",
    "Don't let the day end without your Anki practice! 🌙",
    "Last chance to complete your daily Anki goal! 🎯",
    "Even 5 minutes of Anki is better than none! ⚡",
];

pub const CONFIRMATION_MESSAGE: &str =
    "Great job! ✅ Anki session completed! Keep up the excellent work! 🎉";

pub const TEST_PREFIX: &str = "🧪 Test reminder: ";

/// Which reminder is being composed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Primary,
    Escalation,
    /// One-off message sent at startup
    Test,
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderKind::Primary => write!(f, "primary"),
            ReminderKind::Escalation => write!(f, "escalation"),
            ReminderKind::Test => write!(f, "test"),
        }
    }
}

/// Builds reminder messages from the text pools and the image directory
#[derive(Debug, Clone)]
pub struct ReminderContent {
    image_dir: Option<PathBuf>,
}

impl ReminderContent {
    pub fn new(image_dir: PathBuf) -> Self {
        Self {
            image_dir: Some(image_dir),
        }
    }

    /// Text-only content, no image lookup
    pub fn text_only() -> Self {
        Self { image_dir: None }
    }

    /// Pick a random text for `kind` and a random image from the pool
    ///
    /// The directory is rescanned on every call so images can be added or
    /// removed without a restart.
    pub async fn compose(&self, kind: ReminderKind) -> OutgoingMessage {
        let images = match self.image_dir.as_deref() {
            Some(dir) => list_images(dir).await,
            None => vec![],
        };

        let mut rng = rand::rng();
        let text = match kind {
            ReminderKind::Primary => pick(REMINDER_MESSAGES, &mut rng).to_string(),
            ReminderKind::Escalation => pick(FOLLOWUP_MESSAGES, &mut rng).to_string(),
            ReminderKind::Test => format!("{TEST_PREFIX}{}", pick(REMINDER_MESSAGES, &mut rng)),
        };
        let image = images.choose(&mut rng).cloned();

        OutgoingMessage::with_image(text, image)
    }

    pub fn confirmation(&self) -> OutgoingMessage {
        OutgoingMessage::text(CONFIRMATION_MESSAGE)
    }
}

fn pick<'a>(pool: &[&'a str], rng: &mut impl rand::Rng) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}
