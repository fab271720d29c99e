//! Telegram message size utilities
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

/// Telegram photo caption limit (characters)
pub const CAPTION_LIMIT: usize = 1024;
/// Telegram text message limit (characters)
pub const MESSAGE_LIMIT: usize = 4096;

/// Truncate text to at most `limit` characters, adding an ellipsis if needed
///
/// Telegram counts characters rather than bytes, so this never splits a
/// multi-byte character such as an emoji.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let keep = limit.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}

/// Truncate text to fit a photo caption
pub fn truncate_for_caption(text: &str) -> String {
    truncate_chars(text, CAPTION_LIMIT)
}

/// Truncate text to fit a plain message
pub fn truncate_for_message(text: &str) -> String {
    truncate_chars(text, MESSAGE_LIMIT)
}
