//! SQLite-backed notification center for headless and desktop hosts.
//!
//! # Responsibility
//! - Keep the pending daily-notification queue in `pending_notifications`.
//! - Answer permission prompts with a fixed host policy.
//!
//! # Invariants
//! - At most one pending row per notification id.
//! - Pending rows survive process restarts, like an OS queue.
//! - Authorization is `NotDetermined` until a prompt was answered in this
//!   process.

use crate::model::reminder::DailyTime;
use crate::notify::center::{
    AuthorizationStatus, NotificationCenter, NotificationRequest, NotifyError, NotifyResult,
};
use log::debug;
use rusqlite::{params, Connection, Row};
use std::cell::Cell;

/// Notification center persisting its queue next to app settings.
pub struct SqliteNotificationCenter<'conn> {
    conn: &'conn Connection,
    grant_on_request: bool,
    status: Cell<AuthorizationStatus>,
}

impl<'conn> SqliteNotificationCenter<'conn> {
    /// Creates a center whose permission prompt answers `grant_on_request`.
    pub fn new(conn: &'conn Connection, grant_on_request: bool) -> Self {
        Self {
            conn,
            grant_on_request,
            status: Cell::new(AuthorizationStatus::NotDetermined),
        }
    }

    /// Records an answer delivered by the host platform.
    pub fn record_authorization(&self, granted: bool) {
        self.status.set(AuthorizationStatus::from_granted(granted));
    }
}

impl NotificationCenter for SqliteNotificationCenter<'_> {
    fn request_authorization(&self) -> NotifyResult<bool> {
        self.record_authorization(self.grant_on_request);
        Ok(self.grant_on_request)
    }

    fn authorization_status(&self) -> NotifyResult<AuthorizationStatus> {
        Ok(self.status.get())
    }

    fn add(&self, request: &NotificationRequest) -> NotifyResult<()> {
        self.conn.execute(
            "INSERT INTO pending_notifications (id, hour, minute, title, body, repeats, badge, sound)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                hour = excluded.hour,
                minute = excluded.minute,
                title = excluded.title,
                body = excluded.body,
                repeats = excluded.repeats,
                badge = excluded.badge,
                sound = excluded.sound;",
            params![
                request.id.as_str(),
                request.trigger.hour,
                request.trigger.minute,
                request.title.as_str(),
                request.body.as_str(),
                request.repeats,
                request.badge,
                request.sound,
            ],
        )?;
        debug!(
            "event=center_add module=notify status=ok id={} trigger={}",
            request.id, request.trigger
        );
        Ok(())
    }

    fn remove_pending(&self, id: &str) -> NotifyResult<()> {
        self.conn
            .execute("DELETE FROM pending_notifications WHERE id = ?1;", [id])?;
        Ok(())
    }

    fn remove_all_pending(&self) -> NotifyResult<()> {
        self.conn.execute("DELETE FROM pending_notifications;", [])?;
        Ok(())
    }

    fn pending_requests(&self) -> NotifyResult<Vec<NotificationRequest>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, hour, minute, title, body, repeats, badge, sound
             FROM pending_notifications
             ORDER BY hour ASC, minute ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut requests = Vec::new();
        while let Some(row) = rows.next()? {
            requests.push(parse_pending_row(row)?);
        }
        Ok(requests)
    }
}

fn parse_pending_row(row: &Row<'_>) -> NotifyResult<NotificationRequest> {
    let id: String = row.get("id")?;
    let hour: u8 = row.get("hour")?;
    let minute: u8 = row.get("minute")?;
    if hour > 23 || minute > 59 {
        return Err(NotifyError::Rejected(format!(
            "pending notification `{id}` has invalid trigger {hour}:{minute}"
        )));
    }

    Ok(NotificationRequest {
        trigger: DailyTime { hour, minute },
        title: row.get("title")?,
        body: row.get("body")?,
        repeats: row.get("repeats")?,
        badge: row.get("badge")?,
        sound: row.get("sound")?,
        id,
    })
}
