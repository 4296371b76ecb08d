//! Domain model for the phrase catalog and daily reminders.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own validation of reminder time strings.
//!
//! # Invariants
//! - Languages are immutable once loaded and referenced elsewhere by id.
//! - Reminder entries are plain data; scheduling side effects live in
//!   `notify` and `service`.

pub mod language;
pub mod reminder;
