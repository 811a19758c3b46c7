//! Migrate command - Schema management for the companies, members and use cases tables.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Tables erased by `migrate fresh`
const OWNED_TABLES: &[&str] = &["use_cases", "company_users", "companies"];

/// Human description of a known migration
fn describe(name: &str) -> &'static str {
    match name {
        "m20240101_000001_create_companies_table" => "companies and their settings",
        "m20240101_000002_create_company_users_table" => "company members and roles",
        "m20240101_000003_create_use_cases_table" => "use cases with embedded artifacts",
        "m20240102_000001_add_use_case_indexes" => "use case lookup indexes",
        _ => "unknown migration",
    }
}

/// One line per migration followed by a pending count.
fn status_report(status: &[(String, bool)]) -> String {
    let mut report = String::new();
    for (name, applied) in status {
        let state = if *applied { "applied" } else { "pending" };
        report.push_str(&format!("[{}] {} ({})\n", state, name, describe(name)));
    }

    let pending = status.iter().filter(|(_, applied)| !applied).count();
    if pending == 0 {
        report.push_str("Schema is up to date");
    } else {
        report.push_str(&format!("{} of {} migrations pending", pending, status.len()));
    }
    report
}

fn confirm_fresh(yes: bool) -> AppResult<()> {
    if yes {
        return Ok(());
    }
    Err(AppError::validation(format!(
        "`migrate fresh` drops {} and every row in them; rerun with --yes to confirm",
        OWNED_TABLES.join(", ")
    )))
}

fn db_error(e: sea_orm::DbErr) -> AppError {
    AppError::internal(e.to_string())
}

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    if let MigrateAction::Fresh { yes } = &args.action {
        confirm_fresh(*yes)?;
    }

    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await.map_err(db_error)?;
            tracing::info!("Schema migrated");
        }
        MigrateAction::Down => {
            db.rollback_migration().await.map_err(db_error)?;
            tracing::info!("Last migration rolled back");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await.map_err(db_error)?;
            println!("{}", status_report(&status));
        }
        MigrateAction::Fresh { .. } => {
            tracing::warn!(tables = %OWNED_TABLES.join(","), "Dropping all tenant data");
            db.fresh_migrations().await.map_err(db_error)?;
            tracing::info!("Schema recreated from scratch");
        }
    }

    Ok(())
}
