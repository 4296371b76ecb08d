//! Application context built once per control context.
//!
//! # Responsibility
//! - Own the loaded language catalog (and its load error) and the reminder
//!   coordinator.
//! - Run the launch sequence: first-launch detection and permission status
//!   refresh.
//!
//! # Invariants
//! - Catalog load failures never fail a launch; they surface as
//!   `catalog_error` with an empty catalog.
//! - Launch never rebuilds the pending queue on its own.

use crate::catalog::language_catalog::{CatalogLoad, LanguageCatalog};
use crate::model::language::Language;
use crate::notify::center::NotificationCenter;
use crate::repo::settings_repo::SettingsRepository;
use crate::service::reminder_coordinator::{CoordinatorResult, ReminderCoordinator};
use log::info;
use std::sync::Arc;

/// Summary of one launch, handed to the host shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    /// `true` exactly once per installation; hosts prompt for permission.
    pub first_launch: bool,
    pub permission_granted: bool,
    pub active_language_id: Option<String>,
    pub catalog_error: Option<String>,
    pub reminder_count: usize,
}

/// Explicitly constructed replacement for process-wide manager singletons.
pub struct AppContext<R: SettingsRepository, C: NotificationCenter> {
    catalog: Arc<LanguageCatalog>,
    catalog_error: Option<String>,
    coordinator: ReminderCoordinator<R, C>,
}

impl<R: SettingsRepository, C: NotificationCenter> AppContext<R, C> {
    /// Loads persisted state without running launch-only steps.
    pub fn open(repo: R, center: C, catalog_load: CatalogLoad) -> CoordinatorResult<Self> {
        let catalog = Arc::new(catalog_load.catalog);
        let coordinator = ReminderCoordinator::start(repo, center, Arc::clone(&catalog))?;
        Ok(Self {
            catalog,
            catalog_error: catalog_load.error_message,
            coordinator,
        })
    }

    /// Opens the context and runs the launch sequence.
    pub fn launch(
        repo: R,
        center: C,
        catalog_load: CatalogLoad,
    ) -> CoordinatorResult<(Self, LaunchReport)> {
        let mut context = Self::open(repo, center, catalog_load)?;
        let first_launch = context.coordinator.settings().mark_launched()?;
        context.coordinator.refresh_permission_status()?;

        let report = context.launch_report(first_launch);
        info!(
            "event=app_launch module=service status=ok first_launch={} permission={} language={} catalog_ok={}",
            report.first_launch,
            report.permission_granted,
            report.active_language_id.as_deref().unwrap_or("none"),
            report.catalog_error.is_none()
        );
        Ok((context, report))
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    /// User-visible load error, when the catalog came back empty.
    pub fn catalog_error(&self) -> Option<&str> {
        self.catalog_error.as_deref()
    }

    pub fn coordinator(&self) -> &ReminderCoordinator<R, C> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut ReminderCoordinator<R, C> {
        &mut self.coordinator
    }

    /// Language currently shown as flashcards.
    pub fn current_language(&self) -> Option<&Language> {
        self.coordinator
            .active_language_id()
            .and_then(|id| self.catalog.get(id))
    }

    /// Retry action after a failed load.
    pub fn reload_catalog(&mut self, catalog_load: CatalogLoad) -> CoordinatorResult<()> {
        let catalog = Arc::new(catalog_load.catalog);
        self.coordinator.replace_catalog(Arc::clone(&catalog))?;
        self.catalog = catalog;
        self.catalog_error = catalog_load.error_message;
        Ok(())
    }

    fn launch_report(&self, first_launch: bool) -> LaunchReport {
        LaunchReport {
            first_launch,
            permission_granted: self.coordinator.is_permission_granted(),
            active_language_id: self.coordinator.active_language_id().map(str::to_string),
            catalog_error: self.catalog_error.clone(),
            reminder_count: self.coordinator.entries().len(),
        }
    }
}
