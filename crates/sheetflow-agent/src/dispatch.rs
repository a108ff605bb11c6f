// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduled-message dispatch.
//!
//! A message is due when its status is blank or pending and its date and
//! time are at or before `now`. Every delivery attempt ends with a status
//! write, and each successful write evicts the scheduled-messages cache, so
//! the next pass reads the new status instead of re-sending.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sheetflow_config::model::ScheduleConfig;
use sheetflow_core::{MessageSink, ScheduledMessage};
use sheetflow_store::ConfigStore;
use tracing::{debug, info, warn};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Outcome counts of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
    /// Pending rows that could not be dispatched (no phone, bad date, no content).
    pub skipped: usize,
    /// Deliveries whose status could not be written back.
    pub unrecorded: usize,
}

pub struct Dispatcher {
    store: Arc<ConfigStore>,
    sink: Arc<dyn MessageSink>,
    schedule: ScheduleConfig,
}

impl Dispatcher {
    pub fn new(
        store: Arc<ConfigStore>,
        sink: Arc<dyn MessageSink>,
        schedule: ScheduleConfig,
    ) -> Self {
        Self {
            store,
            sink,
            schedule,
        }
    }

    /// Delivers every message due at `now` (local wall-clock time).
    pub async fn run_once(&self, now: NaiveDateTime) -> DispatchReport {
        let messages = self.store.scheduled_messages().await;
        let mut report = DispatchReport::default();

        for message in messages.iter() {
            if !is_pending(message.status.as_deref(), &self.schedule.pending_status) {
                continue;
            }

            let Some(phone) = message.phone.as_deref() else {
                warn!(row = message.row_index, "scheduled message has no phone number, skipping");
                report.skipped += 1;
                continue;
            };
            let Some(due) = due_at(message) else {
                warn!(
                    row = message.row_index,
                    date = ?message.date,
                    time = ?message.time,
                    "scheduled message has an unreadable date or time, skipping"
                );
                report.skipped += 1;
                continue;
            };
            if due > now {
                continue;
            }
            if message.answer.is_none() && message.media.is_none() {
                warn!(row = message.row_index, "scheduled message has nothing to send, skipping");
                report.skipped += 1;
                continue;
            }

            let status = match self
                .sink
                .deliver(phone, message.answer.as_deref(), message.media.as_deref())
                .await
            {
                Ok(()) => {
                    debug!(row = message.row_index, "scheduled message delivered");
                    report.sent += 1;
                    &self.schedule.sent_status
                }
                Err(e) => {
                    warn!(row = message.row_index, error = %e, "scheduled message delivery failed");
                    report.failed += 1;
                    &self.schedule.failed_status
                }
            };

            if !self.store.update_message_status(message.row_index, status).await {
                report.unrecorded += 1;
            }
        }

        info!(
            sent = report.sent,
            failed = report.failed,
            skipped = report.skipped,
            unrecorded = report.unrecorded,
            "dispatch pass complete"
        );
        report
    }
}

/// Blank or equal to `pending`, ignoring case and surrounding whitespace.
pub fn is_pending(status: Option<&str>, pending: &str) -> bool {
    match status.map(str::trim) {
        None | Some("") => true,
        Some(status) => status.eq_ignore_ascii_case(pending.trim()),
    }
}

/// The instant a message becomes due. A missing time means midnight.
pub fn due_at(message: &ScheduledMessage) -> Option<NaiveDateTime> {
    let date = message.date.as_deref()?.trim();
    let date = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())?;

    let time = match message.time.as_deref().map(str::trim) {
        None | Some("") => NaiveTime::MIN,
        Some(time) => TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(time, format).ok())?,
    };

    Some(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(date: Option<&str>, time: Option<&str>) -> ScheduledMessage {
        ScheduledMessage {
            row_index: 2,
            date: date.map(str::to_string),
            time: time.map(str::to_string),
            phone: Some("+5215550001".into()),
            answer: Some("hola".into()),
            media: None,
            status: None,
        }
    }

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn pending_matches_blank_or_pending_status() {
        assert!(is_pending(None, "pendiente"));
        assert!(is_pending(Some("  "), "pendiente"));
        assert!(is_pending(Some(" PENDIENTE "), "pendiente"));
        assert!(!is_pending(Some("enviado"), "pendiente"));
        assert!(!is_pending(Some("error"), "pendiente"));
    }

    #[test]
    fn due_at_accepts_both_date_formats() {
        let iso = due_at(&message(Some("2026-10-16"), Some("09:30"))).unwrap();
        let local = due_at(&message(Some("16/10/2026"), Some("09:30:00"))).unwrap();
        assert_eq!(iso, at("2026-10-16", "09:30:00"));
        assert_eq!(iso, local);
    }

    #[test]
    fn missing_time_means_midnight() {
        let due = due_at(&message(Some("2026-10-16"), None)).unwrap();
        assert_eq!(due, at("2026-10-16", "00:00:00"));
    }

    #[test]
    fn unreadable_date_or_time_is_none() {
        assert!(due_at(&message(None, Some("09:00"))).is_none());
        assert!(due_at(&message(Some("mañana"), None)).is_none());
        assert!(due_at(&message(Some("2026-10-16"), Some("9am"))).is_none());
    }
}
