//! # Configuration
//!
//! Environment-driven configuration, loaded once at process start.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Configurable acknowledgment mode and startup notification toggle
//! - 1.0.0: Initial release with token, chat and schedule settings

use anyhow::{anyhow, Context, Result};
use chrono::{FixedOffset, NaiveTime, Offset, Utc};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PRIMARY_TIME: &str = "16:00";
pub const DEFAULT_ESCALATION_TIME: &str = "20:30";
/// Moscow has observed a fixed UTC+3 since 2014
pub const DEFAULT_UTC_OFFSET: &str = "+03:00";
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_IMAGE_DIR: &str = "./images";
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Which inbound messages count as an acknowledgment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckMode {
    /// Any message from the target chat
    Any,
    /// Only messages carrying a photo (e.g. a screenshot of the finished session)
    Photo,
}

impl std::str::FromStr for AckMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "any" => Ok(AckMode::Any),
            "photo" => Ok(AckMode::Photo),
            _ => Err(anyhow!("Invalid ACK_MODE: {} (expected 'any' or 'photo')", s)),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub telegram_token: String,
    pub chat_id: i64,
    pub primary_time: NaiveTime,
    pub escalation_time: NaiveTime,
    pub utc_offset: FixedOffset,
    pub tick_interval: Duration,
    pub image_dir: PathBuf,
    pub ack_mode: AckMode,
    pub startup_notification: bool,
    pub api_url: String,
    pub log_level: String,
}

// Hand-written so the token never reaches the logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("telegram_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("primary_time", &self.primary_time)
            .field("escalation_time", &self.escalation_time)
            .field("utc_offset", &self.utc_offset)
            .field("tick_interval", &self.tick_interval)
            .field("image_dir", &self.image_dir)
            .field("ack_mode", &self.ack_mode)
            .field("startup_notification", &self.startup_notification)
            .field("api_url", &self.api_url)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Split out from `from_env` so tests don't have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let telegram_token = get("TELEGRAM_TOKEN")
            .ok_or_else(|| anyhow!("TELEGRAM_TOKEN must be set"))?;

        let chat_id = get("CHAT_ID")
            .ok_or_else(|| anyhow!("CHAT_ID must be set"))?
            .trim()
            .parse::<i64>()
            .context("CHAT_ID must be an integer chat identifier")?;

        let primary_time = parse_time_of_day(
            &get("PRIMARY_TIME").unwrap_or_else(|| DEFAULT_PRIMARY_TIME.to_string()),
        )
        .context("Invalid PRIMARY_TIME")?;
        let escalation_time = parse_time_of_day(
            &get("ESCALATION_TIME").unwrap_or_else(|| DEFAULT_ESCALATION_TIME.to_string()),
        )
        .context("Invalid ESCALATION_TIME")?;

        if escalation_time <= primary_time {
            return Err(anyhow!(
                "ESCALATION_TIME ({}) must be later than PRIMARY_TIME ({})",
                escalation_time.format("%H:%M"),
                primary_time.format("%H:%M")
            ));
        }

        let utc_offset = parse_utc_offset(
            &get("UTC_OFFSET").unwrap_or_else(|| DEFAULT_UTC_OFFSET.to_string()),
        )
        .context("Invalid UTC_OFFSET")?;

        let tick_secs = match get("TICK_INTERVAL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .context("TICK_INTERVAL_SECS must be a positive integer")?,
            None => DEFAULT_TICK_INTERVAL_SECS,
        };
        if tick_secs == 0 {
            return Err(anyhow!("TICK_INTERVAL_SECS must be greater than zero"));
        }

        let ack_mode = match get("ACK_MODE") {
            Some(raw) => raw.parse()?,
            None => AckMode::Any,
        };

        let startup_notification = get("STARTUP_NOTIFICATION")
            .map(|v| v.trim().eq_ignore_ascii_case("enabled"))
            .unwrap_or(true);

        Ok(Config {
            telegram_token,
            chat_id,
            primary_time,
            escalation_time,
            utc_offset,
            tick_interval: Duration::from_secs(tick_secs),
            image_dir: PathBuf::from(
                get("IMAGE_DIR").unwrap_or_else(|| DEFAULT_IMAGE_DIR.to_string()),
            ),
            ack_mode,
            startup_notification,
            api_url: get("TELEGRAM_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Parse an `HH:MM` (or `HH:MM:SS`) time of day
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| anyhow!("Expected HH:MM, got '{}'", raw))
}

/// Parse a fixed offset such as `+03:00`, `-05:30` or `Z`
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }
    raw.parse::<FixedOffset>()
        .map_err(|e| anyhow!("Expected ±HH:MM, got '{}': {}", raw, e))
}
