//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, scheduler, and catalog into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage and platform details.

pub mod app_context;
pub mod reminder_coordinator;
