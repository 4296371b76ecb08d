//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value persistence contract for app settings.
//! - Own the durable reminder entry list (`ReminderStore`).
//!
//! # Invariants
//! - Writes validate reminder times before persistence.
//! - Repositories never touch the notification queue.

pub mod reminder_store;
pub mod settings_repo;
