//! # Feature: Daily Reminder Scheduler
//!
//! Cooperative polling loop that drives [`ReminderState`] for one chat. Every tick
//! evaluates, in order: day rollover, inbound acknowledgments, the primary reminder
//! and the escalation reminder.
//!
//! A reminder flag is only set after the channel confirmed delivery, so a failed
//! dispatch is simply retried on the next tick. A reminder whose image cannot be
//! delivered is resent as text within the same tick. Poll failures count as "no
//! new messages" for that tick.
//!
//! - **Version**: 2.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.1.0: Text-only fallback for rejected images; primary timestamp taken at delivery
//! - 2.0.0: Single polling loop replaces separate cron jobs; startup catch-up for missed instants
//! - 1.1.0: Confirmation message on acknowledgment
//! - 1.0.0: Initial release with primary and follow-up reminders

use chrono::{DateTime, FixedOffset, TimeDelta};
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

use super::messages::{ReminderContent, ReminderKind};
use super::schedule::Schedule;
use super::state::ReminderState;
use crate::core::config::DEFAULT_TICK_INTERVAL_SECS;
use crate::core::{AckMode, IncomingMessage, MessageChannel, OutgoingMessage};

/// What a single tick did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub rolled_over: bool,
    pub acknowledged: bool,
    pub primary_sent: bool,
    pub escalation_sent: bool,
    pub dispatch_failures: usize,
    pub poll_failed: bool,
}

pub struct ReminderScheduler<C: MessageChannel> {
    channel: C,
    chat_id: i64,
    schedule: Schedule,
    content: ReminderContent,
    ack_mode: AckMode,
    tick_interval: Duration,
    /// Created on the first tick
    state: Option<ReminderState>,
}

impl<C: MessageChannel> ReminderScheduler<C> {
    pub fn new(
        channel: C,
        chat_id: i64,
        schedule: Schedule,
        content: ReminderContent,
        ack_mode: AckMode,
    ) -> Self {
        Self {
            channel,
            chat_id,
            schedule,
            content,
            ack_mode,
            tick_interval: Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS),
            state: None,
        }
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn state(&self) -> Option<&ReminderState> {
        self.state.as_ref()
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Tick forever at the configured interval
    ///
    /// The first tick fires immediately, which performs the startup catch-up.
    pub async fn run(&mut self) {
        info!(
            "⏰ Reminder scheduler started for chat {} ({}, every {}s)",
            self.chat_id,
            self.schedule.describe(),
            self.tick_interval.as_secs()
        );

        let mut interval = tokio::time::interval(self.tick_interval);
        // Triggers are "at or after" checks: a skipped tick delays a reminder, never drops it
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let now = self.schedule.now();
            let report = self.tick_at(now).await;
            debug!("Tick at {}: {:?}", now.format("%H:%M:%S"), report);
        }
    }

    /// Evaluate the state machine at local time `now`
    pub async fn tick_at(&mut self, now: DateTime<FixedOffset>) -> TickReport {
        let started = Instant::now();
        let mut report = TickReport::default();
        let today = now.date_naive();
        let time = now.time();

        let mut state = self.state.take().unwrap_or_else(|| {
            info!("📅 Tracking reminders for {today}");
            ReminderState::new(today)
        });
        if state.roll_over(today) {
            info!("🌅 New day {today}: reminder flags reset");
            report.rolled_over = true;
        }

        match self.channel.poll_updates().await {
            Ok(messages) => {
                if self.process_incoming(&mut state, &messages) {
                    report.acknowledged = true;
                    self.send_confirmation().await;
                }
            }
            Err(e) => {
                warn!("Failed to poll updates, treating as no new messages: {e}");
                report.poll_failed = true;
            }
        }

        if state.primary_due(time, &self.schedule) {
            if self.dispatch(ReminderKind::Primary).await {
                // Replies only count from the moment delivery was confirmed
                let elapsed = TimeDelta::from_std(started.elapsed()).unwrap_or(TimeDelta::zero());
                state.mark_primary_sent(now + elapsed);
                report.primary_sent = true;
            } else {
                report.dispatch_failures += 1;
            }
        }

        // Evaluated after the primary so a late start sends both, primary first
        if state.escalation_due(time, &self.schedule) {
            if self.dispatch(ReminderKind::Escalation).await {
                state.mark_escalation_sent();
                report.escalation_sent = true;
            } else {
                report.dispatch_failures += 1;
            }
        }

        self.state = Some(state);
        report
    }

    /// Apply inbound messages; true if one of them acknowledged today's reminder
    fn process_incoming(&self, state: &mut ReminderState, messages: &[IncomingMessage]) -> bool {
        let mut flipped = false;
        for message in messages {
            if message.chat_id != self.chat_id || message.sender_is_bot {
                continue;
            }
            if self.ack_mode == AckMode::Photo && !message.has_photo {
                debug!("Ignoring non-photo message in photo acknowledgment mode");
                continue;
            }

            let local = self.schedule.localize(message.timestamp);
            if state.acknowledge(local) {
                info!(
                    "✅ Reminder acknowledged at {}",
                    local.format("%Y-%m-%d %H:%M:%S")
                );
                flipped = true;
            } else {
                debug!(
                    "Message at {} did not change state (phase {})",
                    local.format("%H:%M:%S"),
                    state.phase()
                );
            }
        }
        flipped
    }

    async fn dispatch(&self, kind: ReminderKind) -> bool {
        let message = self.content.compose(kind).await;
        let err = match self.channel.send(&message).await {
            Ok(()) => {
                match &message.image {
                    Some(path) => info!(
                        "📨 {kind} reminder sent with image: {}",
                        path.file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default()
                    ),
                    None => info!("📨 {kind} reminder sent (text only)"),
                }
                return true;
            }
            Err(e) => e,
        };

        let Some(path) = message.image.as_ref().filter(|_| err.may_be_attachment()) else {
            error!("Failed to dispatch {kind} reminder, will retry next tick: {err}");
            return false;
        };

        warn!(
            "Sending {kind} reminder with {} failed ({err}), retrying as text only",
            path.display()
        );
        match self.channel.send(&OutgoingMessage::text(message.text.clone())).await {
            Ok(()) => {
                info!("📨 {kind} reminder sent (text-only fallback)");
                true
            }
            Err(e) => {
                error!("Failed to dispatch {kind} reminder, will retry next tick: {e}");
                false
            }
        }
    }

    async fn send_confirmation(&self) {
        if let Err(e) = self.channel.send(&self.content.confirmation()).await {
            warn!("Failed to send acknowledgment confirmation: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channel::testing::MemoryChannel;
    use crate::features::reminders::messages::{
        CONFIRMATION_MESSAGE, FOLLOWUP_MESSAGES, REMINDER_MESSAGES,
    };
    use crate::features::reminders::state::ReminderPhase;
    use chrono::{TimeZone, Utc};

    const CHAT: i64 = -1002452488546;

    fn msk(day: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
        Schedule::default()
            .offset
            .with_ymd_and_hms(2024, 5, day, h, m, 0)
            .unwrap()
    }

    fn scheduler() -> ReminderScheduler<MemoryChannel> {
        ReminderScheduler::new(
            MemoryChannel::new(),
            CHAT,
            Schedule::default(),
            ReminderContent::text_only(),
            AckMode::Any,
        )
    }

    fn reply_at(at: DateTime<FixedOffset>) -> IncomingMessage {
        IncomingMessage {
            chat_id: CHAT,
            sender_is_bot: false,
            timestamp: at.with_timezone(&Utc),
            text: Some("done!".to_string()),
            has_photo: false,
        }
    }

    fn count_in(sched: &ReminderScheduler<MemoryChannel>, pool: &[&str]) -> usize {
        sched
            .channel()
            .sent_texts()
            .iter()
            .filter(|t| pool.contains(&t.as_str()))
            .count()
    }

    fn primaries(sched: &ReminderScheduler<MemoryChannel>) -> usize {
        count_in(sched, REMINDER_MESSAGES)
    }

    fn escalations(sched: &ReminderScheduler<MemoryChannel>) -> usize {
        count_in(sched, FOLLOWUP_MESSAGES)
    }

    #[tokio::test]
    async fn test_nothing_sent_before_primary_instant() {
        let mut sched = scheduler();
        for h in 0..16 {
            for m in [0, 30, 59] {
                sched.tick_at(msk(1, h, m)).await;
            }
        }
        assert!(!sched.state().unwrap().primary_sent());
        assert!(sched.channel().sent().is_empty());
    }

    #[tokio::test]
    async fn test_scenario_a_primary_once_at_instant() {
        let mut sched = scheduler();

        let r1 = sched.tick_at(msk(1, 15, 59)).await;
        let r2 = sched.tick_at(msk(1, 16, 0)).await;
        let r3 = sched.tick_at(msk(1, 16, 1)).await;

        assert!(!r1.primary_sent);
        assert!(r2.primary_sent);
        assert!(!r3.primary_sent);
        assert_eq!(primaries(&sched), 1);
        assert_eq!(sched.channel().sent().len(), 1);
        assert_eq!(sched.state().unwrap().phase(), ReminderPhase::AwaitingResponse);
    }

    #[tokio::test]
    async fn test_scenario_b_acknowledgment_suppresses_escalation() {
        let mut sched = scheduler();
        sched.tick_at(msk(1, 16, 0)).await;

        sched.channel().push_incoming(reply_at(msk(1, 17, 0)));
        let report = sched.tick_at(msk(1, 17, 0)).await;
        assert!(report.acknowledged);

        for (h, m) in [(18, 0), (20, 29), (20, 30), (21, 0), (23, 59)] {
            let report = sched.tick_at(msk(1, h, m)).await;
            assert!(!report.escalation_sent);
        }

        assert_eq!(escalations(&sched), 0);
        assert!(sched.state().unwrap().acknowledged());
        assert!(!sched.state().unwrap().escalation_sent());
    }

    #[tokio::test]
    async fn test_acknowledgment_sends_confirmation_once() {
        let mut sched = scheduler();
        sched.tick_at(msk(1, 16, 0)).await;

        sched.channel().push_incoming(reply_at(msk(1, 16, 30)));
        sched.channel().push_incoming(reply_at(msk(1, 16, 31)));
        sched.tick_at(msk(1, 16, 31)).await;
        sched.channel().push_incoming(reply_at(msk(1, 16, 40)));
        sched.tick_at(msk(1, 16, 41)).await;

        let confirmations = sched
            .channel()
            .sent_texts()
            .iter()
            .filter(|t| t.as_str() == CONFIRMATION_MESSAGE)
            .count();
        assert_eq!(confirmations, 1);
    }

    #[tokio::test]
    async fn test_scenario_c_escalation_once_without_reply() {
        let mut sched = scheduler();
        sched.tick_at(msk(1, 16, 0)).await;
        sched.tick_at(msk(1, 20, 29)).await;
        assert_eq!(escalations(&sched), 0);

        let report = sched.tick_at(msk(1, 20, 30)).await;
        assert!(report.escalation_sent);

        for m in 31..60 {
            sched.tick_at(msk(1, 20, m)).await;
        }
        sched.tick_at(msk(1, 23, 59)).await;

        assert_eq!(escalations(&sched), 1);
        assert_eq!(primaries(&sched), 1);
        assert_eq!(sched.state().unwrap().phase(), ReminderPhase::Escalated);
    }

    #[tokio::test]
    async fn test_scenario_d_catch_up_on_late_start() {
        let mut sched = scheduler();

        let report = sched.tick_at(msk(1, 18, 0)).await;
        assert!(report.primary_sent);
        assert!(!report.escalation_sent);
        assert!(!sched.state().unwrap().escalation_sent());

        sched.tick_at(msk(1, 20, 0)).await;
        assert_eq!(escalations(&sched), 0);

        sched.tick_at(msk(1, 20, 30)).await;
        assert_eq!(escalations(&sched), 1);
        assert_eq!(primaries(&sched), 1);
    }

    #[tokio::test]
    async fn test_start_after_escalation_sends_both_in_order() {
        let mut sched = scheduler();

        let report = sched.tick_at(msk(1, 21, 0)).await;
        assert!(report.primary_sent);
        assert!(report.escalation_sent);

        let texts = sched.channel().sent_texts();
        assert_eq!(texts.len(), 2);
        assert!(REMINDER_MESSAGES.contains(&texts[0].as_str()));
        assert!(FOLLOWUP_MESSAGES.contains(&texts[1].as_str()));
    }

    #[tokio::test]
    async fn test_acknowledgment_after_escalation() {
        let mut sched = scheduler();
        sched.tick_at(msk(1, 16, 0)).await;
        sched.tick_at(msk(1, 20, 30)).await;

        sched.channel().push_incoming(reply_at(msk(1, 21, 15)));
        let report = sched.tick_at(msk(1, 21, 16)).await;

        assert!(report.acknowledged);
        assert_eq!(sched.state().unwrap().phase(), ReminderPhase::Acknowledged);
    }

    #[tokio::test]
    async fn test_failed_dispatch_retried_next_tick() {
        let mut sched = scheduler();
        sched.channel().fail_next_sends(2);

        let r1 = sched.tick_at(msk(1, 16, 0)).await;
        assert!(!r1.primary_sent);
        assert_eq!(r1.dispatch_failures, 1);
        assert!(!sched.state().unwrap().primary_sent());

        let r2 = sched.tick_at(msk(1, 16, 1)).await;
        assert!(!r2.primary_sent);

        let r3 = sched.tick_at(msk(1, 16, 2)).await;
        assert!(r3.primary_sent);
        assert_eq!(primaries(&sched), 1);
    }

    #[tokio::test]
    async fn test_failed_escalation_retried() {
        let mut sched = scheduler();
        sched.tick_at(msk(1, 16, 0)).await;

        sched.channel().fail_next_sends(1);
        let r1 = sched.tick_at(msk(1, 20, 30)).await;
        assert!(!r1.escalation_sent);
        assert!(!sched.state().unwrap().escalation_sent());

        let r2 = sched.tick_at(msk(1, 20, 31)).await;
        assert!(r2.escalation_sent);
        assert_eq!(escalations(&sched), 1);
    }

    #[tokio::test]
    async fn test_poll_failure_keeps_messages_for_next_tick() {
        let mut sched = scheduler();
        sched.tick_at(msk(1, 16, 0)).await;

        sched.channel().push_incoming(reply_at(msk(1, 17, 0)));
        sched.channel().fail_next_polls(1);
        let r1 = sched.tick_at(msk(1, 17, 0)).await;
        assert!(r1.poll_failed);
        assert!(!r1.acknowledged);

        let r2 = sched.tick_at(msk(1, 17, 1)).await;
        assert!(r2.acknowledged);
    }

    #[tokio::test]
    async fn test_messages_before_primary_do_not_acknowledge() {
        let mut sched = scheduler();
        sched.channel().push_incoming(reply_at(msk(1, 15, 0)));
        sched.tick_at(msk(1, 15, 30)).await;

        sched.tick_at(msk(1, 16, 0)).await;
        assert!(!sched.state().unwrap().acknowledged());

        sched.tick_at(msk(1, 20, 30)).await;
        assert_eq!(escalations(&sched), 1);
    }

    #[tokio::test]
    async fn test_other_chats_and_bots_ignored() {
        let mut sched = scheduler();
        sched.tick_at(msk(1, 16, 0)).await;

        let mut other_chat = reply_at(msk(1, 17, 0));
        other_chat.chat_id = 12345;
        let mut from_bot = reply_at(msk(1, 17, 0));
        from_bot.sender_is_bot = true;
        sched.channel().push_incoming(other_chat);
        sched.channel().push_incoming(from_bot);

        let report = sched.tick_at(msk(1, 17, 1)).await;
        assert!(!report.acknowledged);
    }

    #[tokio::test]
    async fn test_photo_mode_requires_photo() {
        let mut sched = ReminderScheduler::new(
            MemoryChannel::new(),
            CHAT,
            Schedule::default(),
            ReminderContent::text_only(),
            AckMode::Photo,
        );
        sched.tick_at(msk(1, 16, 0)).await;

        sched.channel().push_incoming(reply_at(msk(1, 17, 0)));
        assert!(!sched.tick_at(msk(1, 17, 0)).await.acknowledged);

        let mut screenshot = reply_at(msk(1, 17, 5));
        screenshot.has_photo = true;
        screenshot.text = None;
        sched.channel().push_incoming(screenshot);
        assert!(sched.tick_at(msk(1, 17, 5)).await.acknowledged);
    }

    #[tokio::test]
    async fn test_day_rollover_resets_flags() {
        let mut sched = scheduler();
        sched.tick_at(msk(1, 16, 0)).await;
        sched.tick_at(msk(1, 20, 30)).await;
        sched.channel().push_incoming(reply_at(msk(1, 21, 0)));
        sched.tick_at(msk(1, 21, 0)).await;

        let report = sched.tick_at(msk(2, 0, 0)).await;
        assert!(report.rolled_over);

        let state = sched.state().unwrap();
        assert_eq!(state.day_key(), msk(2, 0, 0).date_naive());
        assert!(!state.primary_sent());
        assert!(!state.escalation_sent());
        assert!(!state.acknowledged());

        sched.tick_at(msk(2, 16, 0)).await;
        assert_eq!(primaries(&sched), 2);
    }

    #[tokio::test]
    async fn test_yesterdays_reply_does_not_acknowledge_today() {
        let mut sched = scheduler();
        sched.tick_at(msk(1, 16, 0)).await;

        sched.channel().push_incoming(reply_at(msk(1, 23, 59)));
        sched.tick_at(msk(2, 16, 0)).await;

        assert!(!sched.state().unwrap().acknowledged());
        assert!(sched.state().unwrap().primary_sent());
    }

    #[tokio::test]
    async fn test_confirmation_failure_keeps_acknowledgment() {
        let mut sched = scheduler();
        sched.tick_at(msk(1, 16, 0)).await;

        sched.channel().push_incoming(reply_at(msk(1, 16, 10)));
        sched.channel().fail_next_sends(1);
        let report = sched.tick_at(msk(1, 16, 10)).await;

        assert!(report.acknowledged);
        assert!(sched.state().unwrap().acknowledged());
        assert_eq!(report.dispatch_failures, 0);
    }

    #[tokio::test]
    async fn test_rejected_image_falls_back_to_text() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("anki.png"), b"not really a png").unwrap();

        let channel = MemoryChannel::new();
        channel.reject_images();
        let mut sched = ReminderScheduler::new(
            channel,
            CHAT,
            Schedule::default(),
            ReminderContent::new(dir.path().to_path_buf()),
            AckMode::Any,
        );

        let report = sched.tick_at(msk(1, 16, 0)).await;
        assert!(report.primary_sent);
        assert_eq!(report.dispatch_failures, 0);
        assert!(sched.state().unwrap().primary_sent());

        let sent = sched.channel().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].image, None);
        assert!(REMINDER_MESSAGES.contains(&sent[0].text.as_str()));

        sched.tick_at(msk(1, 16, 1)).await;
        assert_eq!(primaries(&sched), 1);
    }

    #[tokio::test]
    async fn test_fallback_failure_retries_next_tick() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("anki.png"), b"png").unwrap();

        let channel = MemoryChannel::new();
        channel.reject_images();
        channel.fail_next_sends(1);
        let mut sched = ReminderScheduler::new(
            channel,
            CHAT,
            Schedule::default(),
            ReminderContent::new(dir.path().to_path_buf()),
            AckMode::Any,
        );

        let r1 = sched.tick_at(msk(1, 16, 0)).await;
        assert!(!r1.primary_sent);
        assert!(!sched.state().unwrap().primary_sent());

        let r2 = sched.tick_at(msk(1, 16, 1)).await;
        assert!(r2.primary_sent);
        assert_eq!(primaries(&sched), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_timestamp_is_delivery_time() {
        let mut sched = ReminderScheduler::new(
            MemoryChannel::new().with_send_delay(Duration::from_secs(90)),
            CHAT,
            Schedule::default(),
            ReminderContent::text_only(),
            AckMode::Any,
        );
        sched.tick_at(msk(1, 16, 0)).await;

        // Written while the send was still in flight
        sched.channel().push_incoming(reply_at(msk(1, 16, 1)));
        assert!(!sched.tick_at(msk(1, 16, 2)).await.acknowledged);

        let confirmed = msk(1, 16, 1) + TimeDelta::seconds(30);
        sched.channel().push_incoming(reply_at(confirmed));
        assert!(sched.tick_at(msk(1, 16, 3)).await.acknowledged);
    }
}
