//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose reminder, language, and permission use-cases to Dart via FRB.
//! - Return snapshot envelopes the UI can render without further calls.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call touching stored state runs under one process-wide control
//!   lock, so mutations and their notification side effects never interleave.
//! - Each call builds its own `AppContext` over a fresh connection; nothing
//!   but paths is cached between calls.

use musta_core::db::open_db;
use musta_core::{
    core_version as core_version_inner, format_time_for_display as format_time_inner,
    init_logging as init_logging_inner, load_catalog_or_empty, ping as ping_inner, AppConfig,
    AppContext, CoordinatorResult, Language, NotificationRequest, Phrase, ReminderEntry,
    SqliteNotificationCenter, SqliteSettingsRepository,
};
use log::warn;
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

/// Answer the headless center gives to `notification_request_permission`.
///
/// Mobile hosts prompt natively and report through
/// `notification_permission_result` instead.
const HOST_GRANTS_ON_REQUEST: bool = true;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();
static CONTROL_LOCK: Mutex<()> = Mutex::new(());

type FfiContext<'conn> =
    AppContext<SqliteSettingsRepository<'conn>, SqliteNotificationCenter<'conn>>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the database and catalog paths for this process.
///
/// Must run before the first stateful call; otherwise `MUSTA_*` environment
/// values (or defaults) are pinned. Returns empty string on success.
///
/// # FFI contract
/// - Repeating the same paths is a no-op.
/// - Different paths after pinning return an error message.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_paths(db_path: String, catalog_path: String) -> String {
    let db_path = db_path.trim();
    let catalog_path = catalog_path.trim();
    if db_path.is_empty() || catalog_path.is_empty() {
        return "configure_paths failed: paths must not be empty".to_string();
    }

    let requested = AppConfig::with_paths(db_path, catalog_path);
    let pinned = APP_CONFIG.get_or_init(|| requested.clone());
    if pinned.db_path == requested.db_path && pinned.catalog_path == requested.catalog_path {
        String::new()
    } else {
        format!(
            "configure_paths failed: already using db={} catalog={}",
            pinned.db_path.display(),
            pinned.catalog_path.display()
        )
    }
}

/// One reminder row ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub id: i64,
    /// Stored `HH:MM` value.
    pub time: String,
    /// 12-hour rendering of `time`.
    pub display_time: String,
    pub is_enabled: bool,
    pub is_custom: bool,
    /// `Custom` or `Default`.
    pub label: String,
}

/// Snapshot returned by every reminder call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderStateResponse {
    /// Whether the requested operation succeeded.
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Entries in store order. Empty on failure.
    pub items: Vec<ReminderItem>,
    pub permission_granted: bool,
    pub active_language_id: Option<String>,
}

impl ReminderStateResponse {
    fn from_context(context: &FfiContext<'_>, message: impl Into<String>) -> Self {
        let coordinator = context.coordinator();
        Self {
            ok: true,
            message: message.into(),
            items: coordinator.entries().iter().map(to_reminder_item).collect(),
            permission_granted: coordinator.is_permission_granted(),
            active_language_id: coordinator.active_language_id().map(str::to_string),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            items: Vec::new(),
            permission_granted: false,
            active_language_id: None,
        }
    }
}

/// Launch summary; `first_launch` tells the host to prompt for permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchResponse {
    pub ok: bool,
    pub message: String,
    pub first_launch: bool,
    pub permission_granted: bool,
    pub active_language_id: Option<String>,
    /// Set when the catalog failed to load; the UI offers a retry.
    pub catalog_error: Option<String>,
    pub reminder_count: u32,
}

/// Catalog row for the language picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageItem {
    pub id: String,
    pub name: String,
    pub native_name: String,
    pub flag: String,
    pub phrase_count: u32,
}

/// Language list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageListResponse {
    pub ok: bool,
    pub message: String,
    pub items: Vec<LanguageItem>,
    pub active_language_id: Option<String>,
    pub catalog_error: Option<String>,
}

impl LanguageListResponse {
    fn from_context(context: &FfiContext<'_>, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            items: context
                .catalog()
                .languages()
                .iter()
                .map(to_language_item)
                .collect(),
            active_language_id: context
                .coordinator()
                .active_language_id()
                .map(str::to_string),
            catalog_error: context.catalog_error().map(str::to_string),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            items: Vec::new(),
            active_language_id: None,
            catalog_error: None,
        }
    }
}

/// One flashcard of the active language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseItem {
    /// List key generated at load time; not stable across calls.
    pub id: String,
    pub phrase: String,
    pub translation: String,
}

/// Flashcard envelope for the active language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseListResponse {
    pub ok: bool,
    pub message: String,
    /// `None` when no language is selectable (e.g. catalog failed to load).
    pub language_id: Option<String>,
    pub language_name: Option<String>,
    /// Phrases in document order.
    pub items: Vec<PhraseItem>,
    pub catalog_error: Option<String>,
}

/// One registration held by the notification center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingItem {
    pub notification_id: String,
    pub time: String,
    pub title: String,
    pub body: String,
}

/// Pending queue envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingListResponse {
    pub ok: bool,
    pub message: String,
    pub items: Vec<PendingItem>,
}

/// Reconcile result envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileResponse {
    pub ok: bool,
    pub message: String,
    pub scheduled: u32,
    pub cancelled: u32,
}

/// Runs the launch sequence: bootstrap, first-launch flag, permission refresh.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Catalog failures are reported in `catalog_error`, not as `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn app_launch() -> LaunchResponse {
    let result = with_connection(|conn, config| {
        let (_, report) = AppContext::launch(
            SqliteSettingsRepository::new(conn),
            SqliteNotificationCenter::new(conn, HOST_GRANTS_ON_REQUEST),
            load_catalog_or_empty(&config.catalog_path),
        )
        .map_err(|err| err.to_string())?;
        Ok(report)
    });

    match result {
        Ok(report) => LaunchResponse {
            ok: true,
            message: "Launched.".to_string(),
            first_launch: report.first_launch,
            permission_granted: report.permission_granted,
            active_language_id: report.active_language_id,
            catalog_error: report.catalog_error,
            reminder_count: to_u32(report.reminder_count),
        },
        Err(err) => LaunchResponse {
            ok: false,
            message: format!("app_launch failed: {err}"),
            first_launch: false,
            permission_granted: false,
            active_language_id: None,
            catalog_error: None,
            reminder_count: 0,
        },
    }
}

/// Lists catalog languages with the active selection.
#[flutter_rust_bridge::frb(sync)]
pub fn catalog_list_languages() -> LanguageListResponse {
    match with_context(|context| Ok(LanguageListResponse::from_context(context, "OK"))) {
        Ok(response) => response,
        Err(err) => LanguageListResponse::failure(format!("catalog_list_languages failed: {err}")),
    }
}

/// Retry action after a failed catalog load.
///
/// # FFI contract
/// - `ok=true` with `catalog_error` set means the retry failed again.
#[flutter_rust_bridge::frb(sync)]
pub fn catalog_reload() -> LanguageListResponse {
    let result = with_context(|context| {
        let path = resolve_config().catalog_path.clone();
        context.reload_catalog(load_catalog_or_empty(path))?;
        let message = if context.catalog_error().is_some() {
            "Catalog still unavailable."
        } else {
            "Catalog reloaded."
        };
        Ok(LanguageListResponse::from_context(context, message))
    });
    match result {
        Ok(response) => response,
        Err(err) => LanguageListResponse::failure(format!("catalog_reload failed: {err}")),
    }
}

/// Phrases of the active language, for the flashcard screen.
///
/// # FFI contract
/// - `ok=true` with no language means there is nothing to show yet; the
///   host shows `catalog_error` and offers `catalog_reload`.
#[flutter_rust_bridge::frb(sync)]
pub fn current_language_phrases() -> PhraseListResponse {
    let result = with_context(|context| {
        let catalog_error = context.catalog_error().map(str::to_string);
        Ok(match context.current_language() {
            Some(language) => PhraseListResponse {
                ok: true,
                message: format!("{} phrase(s).", language.phrases.len()),
                language_id: Some(language.id.clone()),
                language_name: Some(language.name.clone()),
                items: language.phrases.iter().map(to_phrase_item).collect(),
                catalog_error,
            },
            None => PhraseListResponse {
                ok: true,
                message: "No language selected.".to_string(),
                language_id: None,
                language_name: None,
                items: Vec::new(),
                catalog_error,
            },
        })
    });
    result.unwrap_or_else(|err| PhraseListResponse {
        ok: false,
        message: format!("current_language_phrases failed: {err}"),
        language_id: None,
        language_name: None,
        items: Vec::new(),
        catalog_error: None,
    })
}

/// Switches the active language and rebuilds pending notifications.
#[flutter_rust_bridge::frb(sync)]
pub fn language_select(language_id: String) -> ReminderStateResponse {
    reminder_call("language_select", |context| {
        context
            .coordinator_mut()
            .select_language(language_id.trim())?;
        Ok("Language selected.".to_string())
    })
}

/// Current reminder snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_state() -> ReminderStateResponse {
    reminder_call("reminders_state", |_| Ok("OK".to_string()))
}

/// Adds a custom reminder at `time` (`HH:MM`, 24-hour).
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_add(time: String) -> ReminderStateResponse {
    reminder_call("reminder_add", |context| {
        let entry = context.coordinator_mut().add_reminder(time.trim())?;
        Ok(format!("Reminder {} added.", entry.id))
    })
}

/// Enables or disables a reminder. Unknown ids leave state unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_toggle(id: i64) -> ReminderStateResponse {
    reminder_call("reminder_toggle", |context| {
        Ok(match context.coordinator_mut().toggle_reminder(id)? {
            Some(entry) if entry.is_enabled => format!("Reminder {id} enabled."),
            Some(_) => format!("Reminder {id} disabled."),
            None => format!("Reminder {id} not found."),
        })
    })
}

/// Moves a reminder to `new_time`.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_update_time(id: i64, new_time: String) -> ReminderStateResponse {
    reminder_call("reminder_update_time", |context| {
        Ok(
            match context
                .coordinator_mut()
                .update_reminder_time(id, new_time.trim())?
            {
                Some(_) => format!("Reminder {id} updated."),
                None => format!("Reminder {id} not found."),
            },
        )
    })
}

/// Deletes a reminder and its pending notification.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_delete(id: i64) -> ReminderStateResponse {
    reminder_call("reminder_delete", |context| {
        Ok(match context.coordinator_mut().delete_reminder(id)? {
            Some(_) => format!("Reminder {id} deleted."),
            None => format!("Reminder {id} not found."),
        })
    })
}

/// Applies the platform's answer to a permission prompt shown by the host.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_permission_result(granted: bool) -> ReminderStateResponse {
    reminder_call("notification_permission_result", |context| {
        context.coordinator_mut().apply_permission_result(granted)?;
        Ok(permission_message(granted).to_string())
    })
}

/// Prompts through the local notification center and applies the answer.
///
/// # FFI contract
/// - Async call; FRB runs it off the UI thread.
pub fn notification_request_permission() -> ReminderStateResponse {
    reminder_call("notification_request_permission", |context| {
        let granted = context.coordinator_mut().request_permission()?;
        Ok(permission_message(granted).to_string())
    })
}

/// Lists registrations currently held by the notification center.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_pending() -> PendingListResponse {
    match with_context(|context| {
        Ok(context
            .coordinator()
            .pending()
            .into_iter()
            .map(to_pending_item)
            .collect::<Vec<_>>())
    }) {
        Ok(items) => PendingListResponse {
            message: format!("{} pending notification(s).", items.len()),
            ok: true,
            items,
        },
        Err(err) => PendingListResponse {
            ok: false,
            message: format!("reminders_pending failed: {err}"),
            items: Vec::new(),
        },
    }
}

/// Repairs drift between enabled reminders and the pending queue.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_reconcile() -> ReconcileResponse {
    match with_context(|context| Ok(context.coordinator_mut().reconcile())) {
        Ok(report) => ReconcileResponse {
            ok: true,
            message: format!(
                "Scheduled {}, cancelled {}.",
                report.scheduled, report.cancelled
            ),
            scheduled: to_u32(report.scheduled),
            cancelled: to_u32(report.cancelled),
        },
        Err(err) => ReconcileResponse {
            ok: false,
            message: format!("reminders_reconcile failed: {err}"),
            scheduled: 0,
            cancelled: 0,
        },
    }
}

/// Formats `HH:MM` as `hh:mm AM/PM`; unparseable input is echoed back.
#[flutter_rust_bridge::frb(sync)]
pub fn format_time_for_display(time: String) -> String {
    format_time_inner(time.trim())
}

fn reminder_call(
    operation: &str,
    f: impl FnOnce(&mut FfiContext<'_>) -> CoordinatorResult<String>,
) -> ReminderStateResponse {
    let result = with_context(|context| {
        let message = f(context)?;
        Ok(ReminderStateResponse::from_context(context, message))
    });
    match result {
        Ok(response) => response,
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op={operation} error={err}");
            ReminderStateResponse::failure(format!("{operation} failed: {err}"))
        }
    }
}

fn with_context<T>(
    f: impl FnOnce(&mut FfiContext<'_>) -> CoordinatorResult<T>,
) -> Result<T, String> {
    with_connection(|conn, config| {
        let mut context = AppContext::open(
            SqliteSettingsRepository::new(conn),
            SqliteNotificationCenter::new(conn, HOST_GRANTS_ON_REQUEST),
            load_catalog_or_empty(&config.catalog_path),
        )
        .map_err(|err| err.to_string())?;
        f(&mut context).map_err(|err| err.to_string())
    })
}

fn with_connection<T>(
    f: impl FnOnce(&Connection, &AppConfig) -> Result<T, String>,
) -> Result<T, String> {
    let _guard = lock_control();
    let config = resolve_config();
    let conn = open_db(&config.db_path).map_err(|err| format!("DB open failed: {err}"))?;
    f(&conn, config)
}

fn lock_control() -> MutexGuard<'static, ()> {
    // A panic inside a previous call must not brick every later call.
    CONTROL_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

fn resolve_config() -> &'static AppConfig {
    APP_CONFIG.get_or_init(AppConfig::from_env)
}

fn permission_message(granted: bool) -> &'static str {
    if granted {
        "Notifications allowed."
    } else {
        "Notifications not allowed."
    }
}

fn to_reminder_item(entry: &ReminderEntry) -> ReminderItem {
    ReminderItem {
        id: entry.id,
        time: entry.time.clone(),
        display_time: format_time_inner(&entry.time),
        is_enabled: entry.is_enabled,
        is_custom: entry.is_custom,
        label: entry.label().to_string(),
    }
}

fn to_language_item(language: &Language) -> LanguageItem {
    LanguageItem {
        id: language.id.clone(),
        name: language.name.clone(),
        native_name: language.native_name.clone(),
        flag: language.flag.clone(),
        phrase_count: to_u32(language.phrases.len()),
    }
}

fn to_phrase_item(phrase: &Phrase) -> PhraseItem {
    PhraseItem {
        id: phrase.id.to_string(),
        phrase: phrase.phrase.clone(),
        translation: phrase.translation.clone(),
    }
}

fn to_pending_item(request: NotificationRequest) -> PendingItem {
    PendingItem {
        time: request.trigger.to_string(),
        notification_id: request.id,
        title: request.title,
        body: request.body,
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
