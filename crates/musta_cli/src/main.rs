//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `musta_core` linkage.
//! - Run one launch against an in-memory database and print the outcome.
//! - Keep output deterministic for quick local sanity checks.

use musta_core::db::open_db_in_memory;
use musta_core::{
    format_time_for_display, init_logging_from_config, load_catalog_or_empty, AppConfig, AppContext,
    SqliteNotificationCenter, SqliteSettingsRepository,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("musta_core ping={}", musta_core::ping());
    println!("musta_core version={}", musta_core::core_version());

    let config = AppConfig::from_env();
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("musta_core logging disabled: {err}");
    }

    match launch_probe(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("musta_core launch failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn launch_probe(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    let (mut context, report) = AppContext::launch(
        SqliteSettingsRepository::new(&conn),
        SqliteNotificationCenter::new(&conn, true),
        load_catalog_or_empty(&config.catalog_path),
    )?;

    if let Some(error) = report.catalog_error.as_deref() {
        println!(
            "musta_core catalog={} error={error}",
            config.catalog_path.display()
        );
    } else {
        println!("musta_core languages={}", context.catalog().len());
    }

    if report.first_launch {
        context.coordinator_mut().request_permission()?;
    }

    let coordinator = context.coordinator();
    for entry in coordinator.entries() {
        println!(
            "musta_core reminder id={} time={} enabled={}",
            entry.id,
            format_time_for_display(&entry.time),
            entry.is_enabled
        );
    }
    println!(
        "musta_core permission={} pending={}",
        coordinator.is_permission_granted(),
        coordinator.pending().len()
    );
    Ok(())
}
