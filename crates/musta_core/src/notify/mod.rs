//! Notification boundary.
//!
//! # Responsibility
//! - Describe the platform notification capability (`NotificationCenter`).
//! - Provide a headless SQLite-backed center for desktop shells and tests.
//! - Turn reminder entries into concrete daily notification requests.
//!
//! # Invariants
//! - Scheduling under an existing id replaces the previous registration.
//! - Scheduler failures are logged and never propagated to callers.

pub mod center;
pub mod local_center;
pub mod scheduler;
