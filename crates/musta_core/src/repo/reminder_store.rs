//! Durable reminder entry list.
//!
//! # Responsibility
//! - Load, seed, and save the full `ReminderEntry` list.
//! - Provide add/update/toggle/delete with whole-list persistence.
//! - Hold the persisted notification permission flag.
//!
//! # Invariants
//! - Entry ids are unique; a new id is `max(existing) + 1`.
//! - Defaults are seeded only when nothing was persisted before.
//! - A mutation reaches memory only after it was persisted (fail closed).
//! - The store never schedules or cancels notifications.

use crate::model::reminder::{
    regenerated_notification_id, DailyTime, ReminderEntry, ReminderId,
};
use crate::repo::settings_repo::{RepoError, RepoResult, SettingKey, SettingsRepository};
use log::{info, warn};

/// Persisted reminder list backed by a settings repository.
pub struct ReminderStore<R: SettingsRepository> {
    repo: R,
    entries: Vec<ReminderEntry>,
}

impl<R: SettingsRepository> ReminderStore<R> {
    /// Creates an unloaded store. Call [`ReminderStore::load`] before use.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            entries: Vec::new(),
        }
    }

    /// Creates a store and loads persisted entries.
    pub fn open(repo: R) -> RepoResult<Self> {
        let mut store = Self::new(repo);
        store.load()?;
        Ok(store)
    }

    /// Loads persisted entries, seeding and saving defaults on first use.
    ///
    /// An explicitly saved empty list stays empty. Entry JSON that does not
    /// decode is logged and treated as absent.
    pub fn load(&mut self) -> RepoResult<&[ReminderEntry]> {
        let raw = self.repo.get_setting(SettingKey::ReminderEntries)?;
        let decoded = raw.and_then(|raw| {
            match serde_json::from_str::<Vec<ReminderEntry>>(&raw) {
                Ok(entries) => Some(entries),
                Err(err) => {
                    warn!(
                        "event=reminder_store_load module=repo status=error error_code=decode_failed error={err}"
                    );
                    None
                }
            }
        });

        match decoded {
            Some(entries) => {
                info!(
                    "event=reminder_store_load module=repo status=ok entries={}",
                    entries.len()
                );
                self.entries = entries;
            }
            None => {
                let defaults = ReminderEntry::bootstrap_defaults();
                self.commit(defaults)?;
                info!(
                    "event=reminder_store_bootstrap module=repo status=ok entries={}",
                    self.entries.len()
                );
            }
        }

        Ok(&self.entries)
    }

    /// Replaces the persisted list with `entries`.
    pub fn save(&mut self, entries: Vec<ReminderEntry>) -> RepoResult<()> {
        self.commit(entries)
    }

    pub fn entries(&self) -> &[ReminderEntry] {
        &self.entries
    }

    pub fn get(&self, id: ReminderId) -> Option<&ReminderEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Enabled entries in store order.
    pub fn enabled_entries(&self) -> impl Iterator<Item = &ReminderEntry> {
        self.entries.iter().filter(|entry| entry.is_enabled)
    }

    /// Next free id, `max(existing) + 1` or `1` for an empty list.
    pub fn next_id(&self) -> ReminderId {
        self.entries.iter().map(|entry| entry.id).max().unwrap_or(0) + 1
    }

    /// Appends a custom, enabled entry.
    pub fn add(&mut self, time: &str) -> RepoResult<ReminderEntry> {
        DailyTime::parse(time)?;
        let entry = ReminderEntry::custom(self.next_id(), time);

        let mut next = self.entries.clone();
        next.push(entry.clone());
        self.commit(next)?;
        Ok(entry)
    }

    /// Replaces an entry's time and regenerates its notification id.
    ///
    /// Returns `Ok(None)` when no entry has `id`.
    pub fn update(&mut self, id: ReminderId, new_time: &str) -> RepoResult<Option<ReminderEntry>> {
        DailyTime::parse(new_time)?;
        self.mutate(id, |entry| {
            entry.time = new_time.to_string();
            entry.notification_id = Some(regenerated_notification_id(entry.id));
        })
    }

    /// Flips `is_enabled`. Returns `Ok(None)` when no entry has `id`.
    pub fn toggle(&mut self, id: ReminderId) -> RepoResult<Option<ReminderEntry>> {
        self.mutate(id, |entry| entry.is_enabled = !entry.is_enabled)
    }

    /// Removes an entry and returns it. Returns `Ok(None)` when absent.
    pub fn delete(&mut self, id: ReminderId) -> RepoResult<Option<ReminderEntry>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let mut next = self.entries.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        Ok(Some(removed))
    }

    /// Persisted permission flag; an unreadable value counts as not granted.
    pub fn is_permission_granted(&self) -> RepoResult<bool> {
        self.repo.get_flag_or_false(SettingKey::NotificationPermission)
    }

    pub fn set_permission_granted(&self, granted: bool) -> RepoResult<()> {
        self.repo.put_flag(SettingKey::NotificationPermission, granted)
    }

    pub fn settings(&self) -> &R {
        &self.repo
    }

    fn position(&self, id: ReminderId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    fn mutate(
        &mut self,
        id: ReminderId,
        change: impl FnOnce(&mut ReminderEntry),
    ) -> RepoResult<Option<ReminderEntry>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let mut next = self.entries.clone();
        change(&mut next[index]);
        let updated = next[index].clone();
        self.commit(next)?;
        Ok(Some(updated))
    }

    fn commit(&mut self, next: Vec<ReminderEntry>) -> RepoResult<()> {
        let raw = serde_json::to_string(&next).map_err(|err| {
            RepoError::InvalidData(format!(
                "reminder entries failed to encode: {err}"
            ))
        })?;
        self.repo.put_setting(SettingKey::ReminderEntries, &raw)?;
        info!(
            "event=reminder_store_save module=repo status=ok entries={}",
            next.len()
        );
        self.entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ReminderStore;
    use crate::db::open_db_in_memory;
    use crate::repo::settings_repo::{
        RepoError, SettingKey, SettingsRepository, SqliteSettingsRepository,
    };

    #[test]
    fn next_id_follows_max_even_after_gaps() {
        let conn = open_db_in_memory().expect("open db");
        let mut store =
            ReminderStore::open(SqliteSettingsRepository::new(&conn)).expect("open store");

        let third = store.add("09:00").expect("add");
        assert_eq!(third.id, 3);
        store.delete(2).expect("delete");
        assert_eq!(store.add("10:00").expect("add").id, 4);

        store.delete(4).expect("delete");
        assert_eq!(store.next_id(), 4);
    }

    #[test]
    fn lookup_miss_is_a_silent_no_op() {
        let conn = open_db_in_memory().expect("open db");
        let mut store =
            ReminderStore::open(SqliteSettingsRepository::new(&conn)).expect("open store");
        let before = store.entries().to_vec();

        assert_eq!(store.toggle(99).expect("toggle"), None);
        assert_eq!(store.update(99, "10:00").expect("update"), None);
        assert_eq!(store.delete(99).expect("delete"), None);
        assert_eq!(store.entries(), before.as_slice());
    }

    #[test]
    fn invalid_time_is_rejected_before_persisting() {
        let conn = open_db_in_memory().expect("open db");
        let mut store =
            ReminderStore::open(SqliteSettingsRepository::new(&conn)).expect("open store");

        let err = store.add("25:99").expect_err("bad time must fail");
        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(store.entries().len(), 2);
    }

    #[test]
    fn emptied_store_is_not_reseeded() {
        let conn = open_db_in_memory().expect("open db");
        let mut store =
            ReminderStore::open(SqliteSettingsRepository::new(&conn)).expect("open store");
        store.delete(1).expect("delete");
        store.delete(2).expect("delete");

        let reopened =
            ReminderStore::open(SqliteSettingsRepository::new(&conn)).expect("reopen store");
        assert!(reopened.entries().is_empty());
    }

    #[test]
    fn undecodable_entries_fall_back_to_defaults() {
        let conn = open_db_in_memory().expect("open db");
        let repo = SqliteSettingsRepository::new(&conn);
        repo.put_setting(SettingKey::ReminderEntries, "{not json")
            .expect("seed garbage");

        let store = ReminderStore::open(repo).expect("open store");
        let ids: Vec<i64> = store.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
