//! Reminder reconciliation state machine.
//!
//! # Responsibility
//! - Sequence `ReminderStore` mutations with `NotificationScheduler` calls.
//! - Track the active language and the permission flag.
//! - Publish state transitions to observers.
//!
//! # Invariants
//! - After every settled operation the pending queue holds exactly one
//!   registration per enabled entry, built against the active language.
//! - Nothing is scheduled while permission is not granted.
//! - Store writes happen before queue changes, so a failed write leaves both
//!   untouched.
//! - A language switch cancels everything and reschedules enabled entries
//!   under their existing notification ids, in store order.

use crate::catalog::language_catalog::LanguageCatalog;
use crate::model::language::LanguageId;
use crate::model::reminder::{is_app_notification_id, ReminderEntry, ReminderId};
use crate::notify::center::{NotificationCenter, NotificationRequest};
use crate::notify::scheduler::NotificationScheduler;
use crate::repo::reminder_store::ReminderStore;
use crate::repo::settings_repo::{RepoError, SettingsRepository};
use log::info;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Coordinator error for reminder use-cases.
#[derive(Debug)]
pub enum CoordinatorError {
    /// Reminder time is not `HH:MM`.
    InvalidTime(String),
    /// Language id is not in the loaded catalog.
    UnknownLanguage(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for CoordinatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTime(message) => write!(f, "{message}"),
            Self::UnknownLanguage(id) => write!(f, "language not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CoordinatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CoordinatorError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidTime(err.to_string()),
            other => Self::Repo(other),
        }
    }
}

/// Observable state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderEvent {
    /// Entry list after an add/toggle/edit/delete.
    EntriesChanged(Vec<ReminderEntry>),
    PermissionChanged(bool),
    LanguageChanged(LanguageId),
    /// Full forward pass finished; `scheduled` registrations succeeded.
    Rescheduled {
        language_id: Option<LanguageId>,
        scheduled: usize,
    },
}

/// Counts produced by [`ReminderCoordinator::reconcile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub scheduled: usize,
    pub cancelled: usize,
}

type Observer = Box<dyn Fn(&ReminderEvent)>;

/// Use-case facade keeping stored entries and the pending queue in step.
pub struct ReminderCoordinator<R: SettingsRepository, C: NotificationCenter> {
    store: ReminderStore<R>,
    scheduler: NotificationScheduler<C>,
    permission_granted: bool,
    active_language_id: Option<LanguageId>,
    observers: Vec<Observer>,
}

impl<R: SettingsRepository, C: NotificationCenter> ReminderCoordinator<R, C> {
    /// Loads entries, permission flag, and active language.
    ///
    /// Startup never touches the pending queue; registrations made in an
    /// earlier process are still held by the center. The one exception is a
    /// persisted language the catalog no longer has: the fallback to the
    /// first language is a language change and rebuilds the queue.
    pub fn start(repo: R, center: C, catalog: Arc<LanguageCatalog>) -> CoordinatorResult<Self> {
        let store = ReminderStore::open(repo)?;
        let permission_granted = store.is_permission_granted()?;
        let selection = resolve_active_language(store.settings(), &catalog)?;

        info!(
            "event=coordinator_start module=service status=ok entries={} permission={} language={}",
            store.entries().len(),
            permission_granted,
            selection.language_id.as_deref().unwrap_or("none")
        );

        let coordinator = Self {
            store,
            scheduler: NotificationScheduler::new(center, catalog),
            permission_granted,
            active_language_id: selection.language_id,
            observers: Vec::new(),
        };
        if selection.replaced_stale {
            coordinator.rebuild_after_fallback();
        }
        Ok(coordinator)
    }

    /// Registers a state-change observer.
    pub fn subscribe(&mut self, observer: impl Fn(&ReminderEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn entries(&self) -> &[ReminderEntry] {
        self.store.entries()
    }

    pub fn is_permission_granted(&self) -> bool {
        self.permission_granted
    }

    pub fn active_language_id(&self) -> Option<&str> {
        self.active_language_id.as_deref()
    }

    pub fn scheduler(&self) -> &NotificationScheduler<C> {
        &self.scheduler
    }

    pub fn settings(&self) -> &R {
        self.store.settings()
    }

    /// Pending registrations as reported by the center.
    pub fn pending(&self) -> Vec<NotificationRequest> {
        self.scheduler.pending()
    }

    /// Prompts for permission and applies the answer.
    pub fn request_permission(&mut self) -> CoordinatorResult<bool> {
        let granted = self.scheduler.request_permission();
        self.apply_permission_result(granted)?;
        Ok(granted)
    }

    /// Applies a permission answer delivered back to the control context.
    ///
    /// A grant runs a full forward pass over enabled entries; re-registering
    /// an already pending id only replaces it.
    pub fn apply_permission_result(&mut self, granted: bool) -> CoordinatorResult<()> {
        self.store.set_permission_granted(granted)?;
        let changed = self.permission_granted != granted;
        self.permission_granted = granted;
        info!(
            "event=permission_result module=service status=ok granted={} changed={}",
            granted, changed
        );

        if changed {
            self.emit(ReminderEvent::PermissionChanged(granted));
        }
        if granted {
            self.schedule_enabled();
        }
        Ok(())
    }

    /// Syncs the stored flag with the platform's current answer.
    ///
    /// An undetermined status leaves the flag alone. A change counts as a
    /// permission answer (a false-to-true change schedules enabled entries).
    pub fn refresh_permission_status(&mut self) -> CoordinatorResult<bool> {
        if let Some(granted) = self.scheduler.authorization_status().as_granted() {
            if granted != self.permission_granted {
                self.apply_permission_result(granted)?;
            }
        }
        Ok(self.permission_granted)
    }

    /// Adds a custom entry and schedules it when permitted.
    pub fn add_reminder(&mut self, time: &str) -> CoordinatorResult<ReminderEntry> {
        let entry = self.store.add(time)?;
        if self.permission_granted {
            self.scheduler.schedule(&entry, self.language_for_schedule());
        }
        self.emit_entries();
        Ok(entry)
    }

    /// Flips an entry on or off. Unknown ids are a no-op (`Ok(None)`).
    ///
    /// Turning an entry on schedules it only when permission is granted;
    /// otherwise the next grant picks it up with the other enabled entries.
    pub fn toggle_reminder(&mut self, id: ReminderId) -> CoordinatorResult<Option<ReminderEntry>> {
        let Some(entry) = self.store.toggle(id)? else {
            return Ok(None);
        };

        if entry.is_enabled {
            if self.permission_granted {
                self.scheduler.schedule(&entry, self.language_for_schedule());
            }
        } else if let Some(notification_id) = entry.notification_id.as_deref() {
            self.scheduler.cancel(notification_id);
        }

        self.emit_entries();
        Ok(Some(entry))
    }

    /// Replaces an entry's time under a fresh notification id.
    ///
    /// The previous registration is cancelled; the new one is scheduled only
    /// when the entry is enabled and permission is granted.
    pub fn update_reminder_time(
        &mut self,
        id: ReminderId,
        new_time: &str,
    ) -> CoordinatorResult<Option<ReminderEntry>> {
        let old_notification_id = self
            .store
            .get(id)
            .and_then(|entry| entry.notification_id.clone());
        let Some(entry) = self.store.update(id, new_time)? else {
            return Ok(None);
        };

        if let Some(old) = old_notification_id.as_deref() {
            self.scheduler.cancel(old);
        }
        if entry.is_enabled && self.permission_granted {
            self.scheduler.schedule(&entry, self.language_for_schedule());
        }

        self.emit_entries();
        Ok(Some(entry))
    }

    /// Deletes an entry and its registration. Unknown ids are a no-op.
    pub fn delete_reminder(&mut self, id: ReminderId) -> CoordinatorResult<Option<ReminderEntry>> {
        let Some(removed) = self.store.delete(id)? else {
            return Ok(None);
        };
        if let Some(notification_id) = removed.notification_id.as_deref() {
            self.scheduler.cancel(notification_id);
        }

        self.emit_entries();
        Ok(Some(removed))
    }

    /// Switches the active language.
    ///
    /// Without permission only the selection is persisted. With permission
    /// the queue is rebuilt: cancel everything, then schedule every enabled
    /// entry against the new language.
    pub fn select_language(&mut self, language_id: &str) -> CoordinatorResult<()> {
        if !self.scheduler.catalog().contains(language_id) {
            return Err(CoordinatorError::UnknownLanguage(language_id.to_string()));
        }

        self.store.settings().set_selected_language_id(language_id)?;
        let previous = self.active_language_id.replace(language_id.to_string());
        info!(
            "event=language_change module=service status=ok from={} to={} permission={}",
            previous.as_deref().unwrap_or("none"),
            language_id,
            self.permission_granted
        );
        self.emit(ReminderEvent::LanguageChanged(language_id.to_string()));

        if self.permission_granted {
            self.scheduler.cancel_all();
            self.schedule_enabled();
        }
        Ok(())
    }

    /// Swaps in a reloaded catalog and re-resolves a missing or stale
    /// language selection.
    ///
    /// Already scheduled notifications keep their drawn phrase unless the
    /// selection had to fall back, which rebuilds the queue.
    pub fn replace_catalog(&mut self, catalog: Arc<LanguageCatalog>) -> CoordinatorResult<()> {
        let selection_known = self
            .active_language_id
            .as_deref()
            .is_some_and(|id| catalog.contains(id));
        self.scheduler.set_catalog(Arc::clone(&catalog));
        if selection_known {
            return Ok(());
        }

        let selection = resolve_active_language(self.store.settings(), &catalog)?;
        self.active_language_id = selection.language_id;
        if selection.replaced_stale {
            self.rebuild_after_fallback();
        }
        Ok(())
    }

    /// Repairs drift between enabled entries and the pending queue.
    ///
    /// Missing or stale registrations are scheduled; app-owned pending ids
    /// that no enabled entry references are cancelled. Ids outside the app
    /// prefix are left alone.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        if !self.permission_granted {
            return report;
        }

        let pending: HashMap<String, NotificationRequest> = self
            .scheduler
            .pending()
            .into_iter()
            .map(|request| (request.id.clone(), request))
            .collect();

        let mut expected = HashSet::new();
        let language_id = self.language_for_schedule();
        for entry in self.store.enabled_entries() {
            let Some(notification_id) = entry.notification_id.as_deref() else {
                continue;
            };
            expected.insert(notification_id);

            let in_step = pending.get(notification_id).is_some_and(|request| {
                entry
                    .daily_time()
                    .is_ok_and(|trigger| trigger == request.trigger)
            });
            if !in_step && self.scheduler.schedule(entry, language_id).is_scheduled() {
                report.scheduled += 1;
            }
        }

        for id in pending.keys() {
            if is_app_notification_id(id) && !expected.contains(id.as_str()) {
                self.scheduler.cancel(id);
                report.cancelled += 1;
            }
        }

        info!(
            "event=reminder_reconcile module=service status=ok scheduled={} cancelled={}",
            report.scheduled, report.cancelled
        );
        report
    }

    fn rebuild_after_fallback(&self) {
        let Some(language_id) = self.active_language_id.clone() else {
            return;
        };
        info!(
            "event=language_change module=service status=ok to={} reason=stale_selection permission={}",
            language_id, self.permission_granted
        );
        self.emit(ReminderEvent::LanguageChanged(language_id));
        if self.permission_granted {
            self.scheduler.cancel_all();
            self.schedule_enabled();
        }
    }

    fn schedule_enabled(&self) {
        let language_id = self.language_for_schedule();
        let scheduled = self
            .store
            .enabled_entries()
            .filter(|entry| self.scheduler.schedule(entry, language_id).is_scheduled())
            .count();
        self.emit(ReminderEvent::Rescheduled {
            language_id: self.active_language_id.clone(),
            scheduled,
        });
    }

    fn language_for_schedule(&self) -> &str {
        self.active_language_id.as_deref().unwrap_or_default()
    }

    fn emit_entries(&self) {
        if self.observers.is_empty() {
            return;
        }
        self.emit(ReminderEvent::EntriesChanged(self.store.entries().to_vec()));
    }

    fn emit(&self, event: ReminderEvent) {
        for observer in &self.observers {
            observer(&event);
        }
    }
}

/// Outcome of resolving the active language against a catalog.
struct LanguageSelection {
    language_id: Option<LanguageId>,
    /// A persisted id was missing from the catalog and got replaced.
    replaced_stale: bool,
}

/// Persisted selection if the catalog knows it, else the first language.
///
/// An empty catalog (failed load) keeps whatever was persisted so a later
/// retry can still honour it.
fn resolve_active_language<R: SettingsRepository>(
    settings: &R,
    catalog: &LanguageCatalog,
) -> Result<LanguageSelection, RepoError> {
    let persisted = settings.selected_language_id()?;
    if catalog.is_empty() {
        return Ok(LanguageSelection {
            language_id: persisted,
            replaced_stale: false,
        });
    }
    if let Some(id) = persisted.as_deref().filter(|id| catalog.contains(id)) {
        return Ok(LanguageSelection {
            language_id: Some(id.to_string()),
            replaced_stale: false,
        });
    }

    let Some(first) = catalog.first() else {
        return Ok(LanguageSelection {
            language_id: None,
            replaced_stale: false,
        });
    };
    settings.set_selected_language_id(&first.id)?;
    Ok(LanguageSelection {
        language_id: Some(first.id.clone()),
        replaced_stale: persisted.is_some(),
    })
}
