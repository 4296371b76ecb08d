//! Runtime configuration.
//!
//! # Responsibility
//! - Resolve database, catalog, and logging locations from the environment.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - Resolution never fails; missing values fall back to defaults.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "MUSTA_DB_PATH";
pub const ENV_CATALOG_PATH: &str = "MUSTA_CATALOG_PATH";
pub const ENV_LOG_LEVEL: &str = "MUSTA_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "MUSTA_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "musta.sqlite3";
const DEFAULT_CATALOG_FILE_NAME: &str = "languageData.json";
const DEFAULT_LOG_DIR_NAME: &str = "musta-logs";

/// Paths and log settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub catalog_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME),
        }
    }
}

impl AppConfig {
    /// Builds a config from `MUSTA_*` variables over the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        Self {
            db_path: read(ENV_DB_PATH).map_or(defaults.db_path, PathBuf::from),
            catalog_path: read(ENV_CATALOG_PATH).map_or(defaults.catalog_path, PathBuf::from),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map_or(defaults.log_dir, PathBuf::from),
        }
    }

    pub fn with_paths(db_path: impl Into<PathBuf>, catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            catalog_path: catalog_path.into(),
            ..Self::default()
        }
    }
}
