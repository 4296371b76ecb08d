//! Language and phrase records.
//!
//! # Invariants
//! - `Phrase::id` is generated at load time and is only a UI list key; it is
//!   never persisted and differs between loads.
//! - `Language::phrases` keeps source order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a language record (e.g. `fil`, `es`).
pub type LanguageId = String;

/// One phrase/translation pair shown on a flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    /// Per-load list key. Not part of the source document.
    #[serde(skip_serializing, default = "Uuid::new_v4")]
    pub id: Uuid,
    pub phrase: String,
    pub translation: String,
}

impl Phrase {
    pub fn new(phrase: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            phrase: phrase.into(),
            translation: translation.into(),
        }
    }

    /// Notification body text, `"<phrase> - <translation>"`.
    pub fn reminder_text(&self) -> String {
        format!("{} - {}", self.phrase, self.translation)
    }
}

/// A learnable language with its ordered phrase list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: LanguageId,
    pub name: String,
    pub native_name: String,
    pub flag: String,
    #[serde(default)]
    pub phrases: Vec<Phrase>,
}

impl Language {
    /// Returns whether a reminder can draw a phrase from this language.
    pub fn has_phrases(&self) -> bool {
        !self.phrases.is_empty()
    }
}
