//! Daily trigger instants and the fixed local offset they are expressed in

use chrono::{DateTime, FixedOffset, NaiveTime, Offset, Utc};

use crate::core::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Time of day the primary reminder becomes due
    pub primary: NaiveTime,
    /// Time of day the escalation reminder becomes due; always after `primary`
    pub escalation: NaiveTime,
    /// Local offset used for both instants and for the day boundary
    pub offset: FixedOffset,
}

impl Schedule {
    pub fn new(primary: NaiveTime, escalation: NaiveTime, offset: FixedOffset) -> Self {
        Self {
            primary,
            escalation,
            offset,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.primary_time, config.escalation_time, config.utc_offset)
    }

    /// Current wall-clock time in the schedule's offset
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Express a UTC instant in the schedule's offset
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    /// One-line description for startup logs
    pub fn describe(&self) -> String {
        format!(
            "primary {} / escalation {} (UTC{})",
            self.primary.format("%H:%M"),
            self.escalation.format("%H:%M"),
            self.offset
        )
    }
}

impl Default for Schedule {
    /// 16:00 and 20:30 Moscow time
    fn default() -> Self {
        Self::new(
            NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
            NaiveTime::from_hms_opt(20, 30, 0).unwrap_or_default(),
            FixedOffset::east_opt(3 * 3600).unwrap_or_else(|| Utc.fix()),
        )
    }
}
