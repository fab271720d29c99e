//! # Reminder State
//!
//! The single per-day record driving the reminder state machine:
//! `Idle → AwaitingResponse → (Escalated →) Acknowledged`, reset on day rollover.
//!
//! All transitions are pure so the machine can be exercised without a timer or network.
//! Flags only move forward within a day, and the `*_sent` flags are set by the caller
//! strictly after a confirmed dispatch.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, SubsecRound};

use super::schedule::Schedule;

/// Derived position in the daily reminder cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderPhase {
    /// Primary reminder not yet sent today
    Idle,
    /// Primary sent, no acknowledgment yet
    AwaitingResponse,
    /// Escalation sent, still no acknowledgment
    Escalated,
    /// Acknowledged; nothing more is sent today
    Acknowledged,
}

impl std::fmt::Display for ReminderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderPhase::Idle => write!(f, "idle"),
            ReminderPhase::AwaitingResponse => write!(f, "awaiting_response"),
            ReminderPhase::Escalated => write!(f, "escalated"),
            ReminderPhase::Acknowledged => write!(f, "acknowledged"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderState {
    day_key: NaiveDate,
    acknowledged: bool,
    primary_sent: bool,
    escalation_sent: bool,
    /// When the primary reminder went out, truncated to whole seconds
    primary_sent_at: Option<DateTime<FixedOffset>>,
}

impl ReminderState {
    pub fn new(day_key: NaiveDate) -> Self {
        Self {
            day_key,
            acknowledged: false,
            primary_sent: false,
            escalation_sent: false,
            primary_sent_at: None,
        }
    }

    pub fn day_key(&self) -> NaiveDate {
        self.day_key
    }

    pub fn acknowledged(&self) -> bool {
        self.acknowledged
    }

    pub fn primary_sent(&self) -> bool {
        self.primary_sent
    }

    pub fn escalation_sent(&self) -> bool {
        self.escalation_sent
    }

    pub fn primary_sent_at(&self) -> Option<DateTime<FixedOffset>> {
        self.primary_sent_at
    }

    pub fn phase(&self) -> ReminderPhase {
        if self.acknowledged {
            ReminderPhase::Acknowledged
        } else if self.escalation_sent {
            ReminderPhase::Escalated
        } else if self.primary_sent {
            ReminderPhase::AwaitingResponse
        } else {
            ReminderPhase::Idle
        }
    }

    /// Start a fresh day if `today` differs from the current day key
    ///
    /// Returns true when a reset happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if today == self.day_key {
            return false;
        }
        *self = Self::new(today);
        true
    }

    /// Primary reminder is due at or after the primary instant, once per day
    ///
    /// A process started after the instant catches up immediately.
    pub fn primary_due(&self, now: NaiveTime, schedule: &Schedule) -> bool {
        !self.primary_sent && now >= schedule.primary
    }

    pub fn mark_primary_sent(&mut self, at: DateTime<FixedOffset>) {
        self.primary_sent = true;
        self.primary_sent_at = Some(at.trunc_subsecs(0));
    }

    /// Escalation is due at or after the escalation instant, once, and only
    /// while the primary is still unacknowledged
    pub fn escalation_due(&self, now: NaiveTime, schedule: &Schedule) -> bool {
        self.primary_sent && !self.acknowledged && !self.escalation_sent && now >= schedule.escalation
    }

    /// Returns false (and changes nothing) if the primary was never sent
    pub fn mark_escalation_sent(&mut self) -> bool {
        if !self.primary_sent {
            return false;
        }
        self.escalation_sent = true;
        true
    }

    /// Record an inbound message at local time `at` as acknowledgment
    ///
    /// Only the first qualifying message of the day counts: it must arrive after the
    /// primary dispatch and on the same calendar day. Returns true when the flag flipped.
    pub fn acknowledge(&mut self, at: DateTime<FixedOffset>) -> bool {
        if self.acknowledged || at.date_naive() != self.day_key {
            return false;
        }
        match self.primary_sent_at {
            Some(sent_at) if at >= sent_at => {
                self.acknowledged = true;
                true
            }
            _ => false,
        }
    }
}
