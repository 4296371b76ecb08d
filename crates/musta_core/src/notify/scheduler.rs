//! Reminder entry to daily notification adapter.
//!
//! # Responsibility
//! - Build notification content from the active language's phrase pool.
//! - Register, cancel, and list daily repeating notifications.
//!
//! # Invariants
//! - The scheduler holds no durable state; the center owns the queue.
//! - A malformed entry time never reaches the center.
//! - Center failures are logged, not retried, not returned as errors.

use crate::catalog::language_catalog::LanguageCatalog;
use crate::model::reminder::ReminderEntry;
use crate::notify::center::{AuthorizationStatus, NotificationCenter, NotificationRequest};
use log::{debug, error, info, warn};
use rand::seq::IndexedRandom;
use std::sync::Arc;

/// Fixed title of every reminder notification.
pub const REMINDER_TITLE: &str = "Time to learn a new phrase 🤓";
/// Body used when the language is unknown or has no phrases.
pub const FALLBACK_BODY: &str = "Time to practice your language skills!";

/// Result of one `schedule` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled,
    /// Entry was never assigned a notification id.
    MissingNotificationId,
    /// Entry time did not parse as `HH:MM`.
    MalformedTime,
    /// The center refused or failed the registration.
    Rejected,
}

impl ScheduleOutcome {
    pub fn is_scheduled(self) -> bool {
        self == Self::Scheduled
    }
}

/// Adapter from reminder entries to a [`NotificationCenter`].
pub struct NotificationScheduler<C: NotificationCenter> {
    center: C,
    catalog: Arc<LanguageCatalog>,
}

impl<C: NotificationCenter> NotificationScheduler<C> {
    pub fn new(center: C, catalog: Arc<LanguageCatalog>) -> Self {
        Self { center, catalog }
    }

    pub fn center(&self) -> &C {
        &self.center
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    /// Swaps the phrase source after a catalog reload.
    pub fn set_catalog(&mut self, catalog: Arc<LanguageCatalog>) {
        self.catalog = catalog;
    }

    /// Prompts for permission. A failing prompt counts as denied.
    pub fn request_permission(&self) -> bool {
        match self.center.request_authorization() {
            Ok(granted) => granted,
            Err(err) => {
                error!(
                    "event=permission_request module=notify status=error error={}",
                    err
                );
                false
            }
        }
    }

    /// Current platform answer; unreadable status reads as undetermined.
    pub fn authorization_status(&self) -> AuthorizationStatus {
        self.center.authorization_status().unwrap_or_else(|err| {
            warn!(
                "event=permission_status module=notify status=error error={}",
                err
            );
            AuthorizationStatus::NotDetermined
        })
    }

    /// Registers a daily repeating notification for `entry`.
    ///
    /// The body phrase is drawn once, uniformly at random, from
    /// `language_id`'s phrase pool.
    pub fn schedule(&self, entry: &ReminderEntry, language_id: &str) -> ScheduleOutcome {
        let Some(notification_id) = entry.notification_id.as_deref() else {
            warn!(
                "event=notification_schedule module=notify status=skip entry_id={} reason=missing_notification_id",
                entry.id
            );
            return ScheduleOutcome::MissingNotificationId;
        };

        let trigger = match entry.daily_time() {
            Ok(trigger) => trigger,
            Err(err) => {
                warn!(
                    "event=notification_schedule module=notify status=skip entry_id={} id={} reason=malformed_time error={}",
                    entry.id, notification_id, err
                );
                return ScheduleOutcome::MalformedTime;
            }
        };

        let request = NotificationRequest {
            id: notification_id.to_string(),
            title: REMINDER_TITLE.to_string(),
            body: self.reminder_body(language_id),
            trigger,
            repeats: true,
            badge: Some(1),
            sound: true,
        };

        match self.center.add(&request) {
            Ok(()) => {
                info!(
                    "event=notification_schedule module=notify status=ok entry_id={} id={} trigger={} language={}",
                    entry.id, notification_id, trigger, language_id
                );
                ScheduleOutcome::Scheduled
            }
            Err(err) => {
                error!(
                    "event=notification_schedule module=notify status=error entry_id={} id={} error={}",
                    entry.id, notification_id, err
                );
                ScheduleOutcome::Rejected
            }
        }
    }

    /// Removes one pending registration; unknown ids are ignored.
    pub fn cancel(&self, notification_id: &str) {
        match self.center.remove_pending(notification_id) {
            Ok(()) => info!(
                "event=notification_cancel module=notify status=ok id={}",
                notification_id
            ),
            Err(err) => error!(
                "event=notification_cancel module=notify status=error id={} error={}",
                notification_id, err
            ),
        }
    }

    /// Clears every pending registration regardless of origin.
    pub fn cancel_all(&self) {
        match self.center.remove_all_pending() {
            Ok(()) => info!("event=notification_cancel_all module=notify status=ok"),
            Err(err) => error!(
                "event=notification_cancel_all module=notify status=error error={}",
                err
            ),
        }
    }

    /// Pending registrations; an unreadable queue reads as empty.
    pub fn pending(&self) -> Vec<NotificationRequest> {
        self.center.pending_requests().unwrap_or_else(|err| {
            error!(
                "event=notification_pending module=notify status=error error={}",
                err
            );
            Vec::new()
        })
    }

    fn reminder_body(&self, language_id: &str) -> String {
        let Some(language) = self.catalog.get(language_id) else {
            debug!(
                "event=notification_body module=notify status=fallback language={} reason=unknown_language",
                language_id
            );
            return FALLBACK_BODY.to_string();
        };
        if !language.has_phrases() {
            debug!(
                "event=notification_body module=notify status=fallback language={} reason=no_phrases",
                language_id
            );
            return FALLBACK_BODY.to_string();
        }

        language
            .phrases
            .choose(&mut rand::rng())
            .map(|phrase| phrase.reminder_text())
            .unwrap_or_else(|| FALLBACK_BODY.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{NotificationScheduler, ScheduleOutcome, FALLBACK_BODY, REMINDER_TITLE};
    use crate::catalog::language_catalog::LanguageCatalog;
    use crate::db::open_db_in_memory;
    use crate::model::language::{Language, Phrase};
    use crate::model::reminder::{DailyTime, ReminderEntry};
    use crate::notify::center::NotificationCenter;
    use crate::notify::local_center::SqliteNotificationCenter;
    use std::sync::Arc;

    fn catalog() -> Arc<LanguageCatalog> {
        Arc::new(LanguageCatalog::new(vec![
            Language {
                id: "fil".to_string(),
                name: "Filipino".to_string(),
                native_name: "Filipino".to_string(),
                flag: "PH".to_string(),
                phrases: vec![
                    Phrase::new("Salamat", "Thank you"),
                    Phrase::new("Kumusta", "How are you"),
                ],
            },
            Language {
                id: "empty".to_string(),
                name: "Empty".to_string(),
                native_name: "Empty".to_string(),
                flag: "--".to_string(),
                phrases: Vec::new(),
            },
        ]))
    }

    #[test]
    fn schedule_builds_daily_request_from_phrase_pool() {
        let conn = open_db_in_memory().expect("open db");
        let scheduler =
            NotificationScheduler::new(SqliteNotificationCenter::new(&conn, true), catalog());
        let entry = ReminderEntry::custom(3, "21:30");

        assert_eq!(scheduler.schedule(&entry, "fil"), ScheduleOutcome::Scheduled);

        let pending = scheduler.pending();
        assert_eq!(pending.len(), 1);
        let request = &pending[0];
        assert_eq!(request.id, "musta_notification_3");
        assert_eq!(request.title, REMINDER_TITLE);
        assert_eq!(request.trigger, DailyTime { hour: 21, minute: 30 });
        assert!(request.repeats);
        assert!(
            request.body == "Salamat - Thank you" || request.body == "Kumusta - How are you",
            "unexpected body {}",
            request.body
        );
    }

    #[test]
    fn unknown_or_empty_language_uses_fallback_body() {
        let conn = open_db_in_memory().expect("open db");
        let scheduler =
            NotificationScheduler::new(SqliteNotificationCenter::new(&conn, true), catalog());

        scheduler.schedule(&ReminderEntry::custom(1, "08:00"), "empty");
        scheduler.schedule(&ReminderEntry::custom(2, "09:00"), "klingon");

        let pending = scheduler.pending();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|request| request.body == FALLBACK_BODY));
    }

    #[test]
    fn malformed_time_registers_nothing() {
        let conn = open_db_in_memory().expect("open db");
        let center = SqliteNotificationCenter::new(&conn, true);
        let scheduler = NotificationScheduler::new(&center, catalog());
        let mut entry = ReminderEntry::custom(4, "08:00");
        entry.time = "25:99".to_string();

        assert_eq!(
            scheduler.schedule(&entry, "fil"),
            ScheduleOutcome::MalformedTime
        );
        assert!(center.pending_requests().expect("pending").is_empty());
    }

    #[test]
    fn entry_without_notification_id_is_skipped() {
        let conn = open_db_in_memory().expect("open db");
        let scheduler =
            NotificationScheduler::new(SqliteNotificationCenter::new(&conn, true), catalog());
        let mut entry = ReminderEntry::custom(5, "08:00");
        entry.notification_id = None;

        assert_eq!(
            scheduler.schedule(&entry, "fil"),
            ScheduleOutcome::MissingNotificationId
        );
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn scheduling_twice_keeps_one_registration() {
        let conn = open_db_in_memory().expect("open db");
        let scheduler =
            NotificationScheduler::new(SqliteNotificationCenter::new(&conn, true), catalog());
        let entry = ReminderEntry::custom(6, "07:15");

        assert!(scheduler.schedule(&entry, "fil").is_scheduled());
        assert!(scheduler.schedule(&entry, "fil").is_scheduled());
        assert_eq!(scheduler.pending().len(), 1);
    }

    #[test]
    fn center_failures_are_reported_but_never_raised() {
        let conn = open_db_in_memory().expect("open db");
        let scheduler =
            NotificationScheduler::new(SqliteNotificationCenter::new(&conn, true), catalog());
        conn.execute_batch("DROP TABLE pending_notifications;")
            .expect("drop queue table");

        assert_eq!(
            scheduler.schedule(&ReminderEntry::custom(7, "07:00"), "fil"),
            ScheduleOutcome::Rejected
        );
        scheduler.cancel("musta_notification_7");
        scheduler.cancel_all();
        assert!(scheduler.pending().is_empty());
    }
}
