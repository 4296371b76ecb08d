//! Key-value settings repository and SQLite implementation.
//!
//! # Responsibility
//! - Persist small string values under stable keys.
//! - Provide typed accessors for flags shared across launches.
//!
//! # Invariants
//! - `put_setting` overwrites; there is no partial update of a value.
//! - Boolean flags are stored as `true`/`false`; anything else is invalid data.
//! - Flags read during launch never fail on invalid data; they read as `false`.

use crate::db::DbError;
use crate::model::reminder::ReminderValidationError;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for settings and reminder persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ReminderValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted settings: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ReminderValidationError> for RepoError {
    fn from(value: ReminderValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Stable keys of the persisted settings map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ReminderEntries,
    NotificationPermission,
    SelectedLanguageId,
    HasLaunchedBefore,
}

impl SettingKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReminderEntries => "reminder_entries",
            Self::NotificationPermission => "notification_permission",
            Self::SelectedLanguageId => "selected_language_id",
            Self::HasLaunchedBefore => "has_launched_before",
        }
    }
}

/// Key-value persistence contract.
///
/// Typed accessors are provided on top of the three raw operations.
pub trait SettingsRepository {
    fn get_setting(&self, key: SettingKey) -> RepoResult<Option<String>>;
    fn put_setting(&self, key: SettingKey, value: &str) -> RepoResult<()>;
    fn delete_setting(&self, key: SettingKey) -> RepoResult<()>;

    /// Reads a boolean flag; an absent key reads as `false`.
    fn get_flag(&self, key: SettingKey) -> RepoResult<bool> {
        match self.get_setting(key)?.as_deref() {
            None => Ok(false),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(RepoError::InvalidData(format!(
                "invalid flag value `{other}` for `{}`",
                key.as_str()
            ))),
        }
    }

    /// Reads a boolean flag, treating an invalid stored value as `false`.
    ///
    /// Transport errors still propagate.
    fn get_flag_or_false(&self, key: SettingKey) -> RepoResult<bool> {
        match self.get_flag(key) {
            Err(RepoError::InvalidData(message)) => {
                warn!(
                    "event=settings_flag_read module=repo status=error error_code=invalid_flag key={} error={}",
                    key.as_str(),
                    message
                );
                Ok(false)
            }
            other => other,
        }
    }

    fn put_flag(&self, key: SettingKey, value: bool) -> RepoResult<()> {
        self.put_setting(key, if value { "true" } else { "false" })
    }

    fn selected_language_id(&self) -> RepoResult<Option<String>> {
        self.get_setting(SettingKey::SelectedLanguageId)
    }

    fn set_selected_language_id(&self, language_id: &str) -> RepoResult<()> {
        self.put_setting(SettingKey::SelectedLanguageId, language_id)
    }

    /// Marks the app as launched and returns whether this was the first launch.
    fn mark_launched(&self) -> RepoResult<bool> {
        if self.get_flag_or_false(SettingKey::HasLaunchedBefore)? {
            return Ok(false);
        }
        self.put_flag(SettingKey::HasLaunchedBefore, true)?;
        Ok(true)
    }
}

/// SQLite-backed settings repository over the `app_settings` table.
#[derive(Clone, Copy)]
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn get_setting(&self, key: SettingKey) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM app_settings WHERE key = ?1;",
                [key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_setting(&self, key: SettingKey, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO app_settings (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key.as_str(), value],
        )?;
        Ok(())
    }

    fn delete_setting(&self, key: SettingKey) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM app_settings WHERE key = ?1;", [key.as_str()])?;
        Ok(())
    }
}
