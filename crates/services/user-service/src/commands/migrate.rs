//! Migrate command - schema management for the `users` table.

use common::{AppError, AppResult};
use sea_orm::DbErr;

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::UserServiceConfig;
use crate::infra::Database;

fn migration_failed(err: DbErr) -> AppError {
    AppError::internal(format!("Migration failed: {}", err))
}

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: &UserServiceConfig) -> AppResult<()> {
    // Migrations are never applied implicitly here
    let db = Database::connect_without_migrations(&config.database)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await.map_err(migration_failed)?;
            tracing::info!("Migrations applied");
        }
        MigrateAction::Down => {
            db.rollback_migration().await.map_err(migration_failed)?;
            tracing::info!("Last migration rolled back");
        }
        MigrateAction::Status => {
            for (name, applied) in db.migration_status().await.map_err(migration_failed)? {
                println!("{} {}", if applied { "[x]" } else { "[ ]" }, name);
            }
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping every table and re-running all migrations");
            db.fresh_migrations().await.map_err(migration_failed)?;
            tracing::info!("Database rebuilt");
        }
    }

    Ok(())
}
