//! Core domain logic for Musta.
//! This crate is the single source of truth for reminder scheduling
//! invariants: persisted entries and the pending notification queue are kept
//! in step here, never in UI code.

pub mod catalog;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use catalog::language_catalog::{
    load_catalog_or_empty, CatalogError, CatalogLoad, LanguageCatalog,
    CATALOG_LOAD_FAILED_MESSAGE,
};
pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::language::{Language, LanguageId, Phrase};
pub use model::reminder::{
    format_time_for_display, DailyTime, ReminderEntry, ReminderId, ReminderValidationError,
    NOTIFICATION_ID_PREFIX,
};
pub use notify::center::{
    AuthorizationStatus, NotificationCenter, NotificationRequest, NotifyError, NotifyResult,
};
pub use notify::local_center::SqliteNotificationCenter;
pub use notify::scheduler::{NotificationScheduler, ScheduleOutcome, FALLBACK_BODY, REMINDER_TITLE};
pub use repo::reminder_store::ReminderStore;
pub use repo::settings_repo::{
    RepoError, RepoResult, SettingKey, SettingsRepository, SqliteSettingsRepository,
};
pub use service::app_context::{AppContext, LaunchReport};
pub use service::reminder_coordinator::{
    CoordinatorError, CoordinatorResult, ReconcileReport, ReminderCoordinator, ReminderEvent,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
