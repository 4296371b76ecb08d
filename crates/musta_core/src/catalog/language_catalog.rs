//! Language catalog loading and lookups.
//!
//! The source document has the shape `{"languages": [Language, ...]}`.

use crate::model::language::{Language, LanguageId};
use log::{error, info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// User-visible message shown when no languages could be loaded.
pub const CATALOG_LOAD_FAILED_MESSAGE: &str = "Failed to load languages";

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while reading the language document.
#[derive(Debug)]
pub enum CatalogError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read language data `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "malformed language data: {err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Deserialize)]
struct LanguageDocument {
    languages: Vec<Language>,
}

/// Immutable list of languages in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageCatalog {
    languages: Vec<Language>,
}

impl LanguageCatalog {
    pub fn new(languages: Vec<Language>) -> Self {
        Self { languages }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Decodes a catalog from document text.
    pub fn from_json_str(raw: &str) -> CatalogResult<Self> {
        let document: LanguageDocument = serde_json::from_str(raw)?;
        Ok(Self::new(document.languages))
    }

    /// Reads and decodes a catalog file.
    pub fn load_from_path(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn get(&self, id: &str) -> Option<&Language> {
        self.languages.iter().find(|language| language.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Default selection when nothing was chosen before.
    pub fn first(&self) -> Option<&Language> {
        self.languages.first()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn ids(&self) -> Vec<LanguageId> {
        self.languages.iter().map(|l| l.id.clone()).collect()
    }
}

/// Result of a launch-time (or retry) catalog load.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoad {
    pub catalog: LanguageCatalog,
    /// Set when the catalog came back empty; drives the retry affordance.
    pub error_message: Option<String>,
}

impl CatalogLoad {
    pub fn is_ok(&self) -> bool {
        self.error_message.is_none()
    }
}

/// Loads the catalog, degrading every failure to an empty catalog.
///
/// # Side effects
/// - Emits `catalog_load` events with duration and language count.
pub fn load_catalog_or_empty(path: impl AsRef<Path>) -> CatalogLoad {
    let started_at = Instant::now();
    match LanguageCatalog::load_from_path(path) {
        Ok(catalog) if catalog.is_empty() => {
            warn!(
                "event=catalog_load module=catalog status=error duration_ms={} error_code=catalog_empty",
                started_at.elapsed().as_millis()
            );
            CatalogLoad {
                catalog,
                error_message: Some(CATALOG_LOAD_FAILED_MESSAGE.to_string()),
            }
        }
        Ok(catalog) => {
            info!(
                "event=catalog_load module=catalog status=ok duration_ms={} languages={}",
                started_at.elapsed().as_millis(),
                catalog.len()
            );
            CatalogLoad {
                catalog,
                error_message: None,
            }
        }
        Err(err) => {
            error!(
                "event=catalog_load module=catalog status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            CatalogLoad {
                catalog: LanguageCatalog::empty(),
                error_message: Some(CATALOG_LOAD_FAILED_MESSAGE.to_string()),
            }
        }
    }
}
