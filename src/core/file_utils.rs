//! File utility functions for reminder image attachments
//!
//! Helpers for discovering the image pool on disk, mapping extensions to
//! MIME types for upload, and respecting Telegram photo limits.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.1.0: Image pool scan uses tokio::fs so it never blocks the tick loop
//! - 1.0.0: Initial creation with image pool and MIME helpers

use log::{debug, warn};
use std::path::{Path, PathBuf};

// ============================================================================
// Constants
// ============================================================================

/// Telegram Bot API upload limit for photos (10 MB)
pub const TELEGRAM_PHOTO_LIMIT: u64 = 10 * 1024 * 1024;

/// Extensions accepted into the image pool
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

// ============================================================================
// Image pool
// ============================================================================

/// Whether a path looks like a supported image file
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// List uploadable images in `dir`, sorted by path
///
/// A missing or unreadable directory yields an empty pool; reminders then go
/// out as text only.
pub async fn list_images(dir: &Path) -> Vec<PathBuf> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Image directory {} unavailable: {}", dir.display(), e);
            return vec![];
        }
    };

    let mut images = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read entry in {}: {}", dir.display(), e);
                break;
            }
        };

        let path = entry.path();
        if !is_image_path(&path) {
            continue;
        }
        let size = match entry.metadata().await {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => continue,
        };
        if !is_within_upload_limit(size) {
            warn!(
                "Skipping {} ({}): exceeds Telegram photo limit",
                path.display(),
                format_file_size(size)
            );
            continue;
        }
        images.push(path);
    }

    images.sort();
    images
}

/// Whether a file of `size` bytes can be sent as a photo
pub fn is_within_upload_limit(size: u64) -> bool {
    size <= TELEGRAM_PHOTO_LIMIT
}

/// Human-readable file size (e.g. "1.5 MB")
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

// ============================================================================
// MIME mapping
// ============================================================================

/// Map an image file extension to its MIME type.
pub fn extension_to_mime(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// MIME type for a path, based on its extension
pub fn mime_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .map(extension_to_mime)
        .unwrap_or("application/octet-stream")
}
