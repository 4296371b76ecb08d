//! Reminder entry model and daily time parsing.
//!
//! # Responsibility
//! - Define the persisted `ReminderEntry` shape.
//! - Parse and format `HH:MM` reminder times.
//! - Build opaque notification ids.
//!
//! # Invariants
//! - `time` matches `HH:MM`, hours `00`-`23`, minutes `00`-`59`.
//! - A regenerated notification id never equals any id built before it.
//! - Serialized field names are `id`, `time`, `isEnabled`, `isCustom`,
//!   `notificationID`.

use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Integer id of a reminder entry, unique within the store.
pub type ReminderId = i64;

/// Prefix shared by every notification id this app registers.
pub const NOTIFICATION_ID_PREFIX: &str = "musta_notification_";

/// Times seeded when the store is empty on first load.
pub const DEFAULT_REMINDER_TIMES: [&str; 2] = ["08:00", "20:00"];

static DAILY_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):([0-5][0-9])$").expect("valid time regex"));

/// Validation error for reminder time strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderValidationError {
    MalformedTime(String),
}

impl Display for ReminderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedTime(value) => {
                write!(f, "reminder time must be HH:MM (24-hour), got `{value}`")
            }
        }
    }
}

impl Error for ReminderValidationError {}

/// Hour and minute of a daily repeating trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DailyTime {
    pub hour: u8,
    pub minute: u8,
}

impl DailyTime {
    /// Parses a strict `HH:MM` 24-hour string.
    pub fn parse(value: &str) -> Result<Self, ReminderValidationError> {
        let malformed = || ReminderValidationError::MalformedTime(value.to_string());
        let caps = DAILY_TIME_RE.captures(value).ok_or_else(malformed)?;
        let hour = caps[1].parse::<u8>().map_err(|_| malformed())?;
        let minute = caps[2].parse::<u8>().map_err(|_| malformed())?;
        Ok(Self { hour, minute })
    }
}

impl Display for DailyTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Persisted reminder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEntry {
    pub id: ReminderId,
    pub time: String,
    #[serde(rename = "isEnabled")]
    pub is_enabled: bool,
    #[serde(rename = "isCustom")]
    pub is_custom: bool,
    #[serde(rename = "notificationID", default)]
    pub notification_id: Option<String>,
}

impl ReminderEntry {
    /// Creates a user-added entry, enabled, with the initial notification id.
    pub fn custom(id: ReminderId, time: impl Into<String>) -> Self {
        Self {
            id,
            time: time.into(),
            is_enabled: true,
            is_custom: true,
            notification_id: Some(initial_notification_id(id)),
        }
    }

    /// The two entries seeded into an empty store (`08:00`, `20:00`).
    pub fn bootstrap_defaults() -> Vec<Self> {
        DEFAULT_REMINDER_TIMES
            .iter()
            .zip(1..)
            .map(|(time, id)| Self {
                id,
                time: (*time).to_string(),
                is_enabled: true,
                is_custom: false,
                notification_id: Some(initial_notification_id(id)),
            })
            .collect()
    }

    /// Parsed trigger time, or the validation error for a malformed string.
    pub fn daily_time(&self) -> Result<DailyTime, ReminderValidationError> {
        DailyTime::parse(&self.time)
    }

    /// Settings row label.
    pub fn label(&self) -> &'static str {
        if self.is_custom {
            "Custom"
        } else {
            "Default"
        }
    }
}

/// Notification id assigned when an entry is created.
pub fn initial_notification_id(id: ReminderId) -> String {
    format!("{NOTIFICATION_ID_PREFIX}{id}")
}

/// Fresh notification id for an entry whose time was edited.
///
/// The random suffix keeps the new id distinct from the previous one even
/// when two edits land within the same clock tick.
pub fn regenerated_notification_id(id: ReminderId) -> String {
    format!("{NOTIFICATION_ID_PREFIX}{id}_{}", Uuid::new_v4().simple())
}

/// Returns whether a pending notification id belongs to this app.
pub fn is_app_notification_id(value: &str) -> bool {
    value.starts_with(NOTIFICATION_ID_PREFIX)
}

/// Formats `HH:MM` as 12-hour `hh:mm AM/PM` for display.
///
/// Input that does not parse is returned unchanged.
pub fn format_time_for_display(value: &str) -> String {
    match NaiveTime::parse_from_str(value, "%H:%M") {
        Ok(time) => time.format("%I:%M %p").to_string(),
        Err(_) => value.to_string(),
    }
}
