//! Read-only language catalog.
//!
//! # Responsibility
//! - Load the language/phrase document once per launch (or on retry).
//! - Answer lookups by language id for display and notification content.
//!
//! # Invariants
//! - A failed load never aborts the app; callers get an empty catalog and a
//!   user-visible message.

pub mod language_catalog;
