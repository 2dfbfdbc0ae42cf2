//! User Service Library
//!
//! A demo consumer of the entity repository: a `users` table with its
//! migration, a `UserService` built on `Repository<User>`, and the CLI
//! commands that drive it.

pub mod cli;
pub mod commands;
pub mod config;
pub mod entities;
pub mod infra;
pub mod service;

use common::{AppError, AppResult};

use crate::cli::args::UserArgs;
use crate::config::UserServiceConfig;
use crate::infra::Database;
use crate::service::UserManager;

/// Connect (applying pending migrations) and run a user command, one
/// Unit of Work per service call.
pub async fn run_user_command(args: UserArgs, config: &UserServiceConfig) -> AppResult<()> {
    let db = Database::connect(&config.database)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let service = UserManager::new(db, config.repository.clone());
    commands::user::execute(args, &service).await
}
