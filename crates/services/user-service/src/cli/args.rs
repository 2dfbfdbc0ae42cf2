//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

/// User service - user management over the entity repository
#[derive(Parser, Debug)]
#[command(name = "user-service")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage users
    User(UserArgs),
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the user command
#[derive(Parser, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub action: UserAction,
}

/// Equality filters on user columns
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct UserFilterArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
}

/// User management actions
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum UserAction {
    /// Create a user
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
    /// Show a user by ID
    Get { id: Uuid },
    /// List users
    List {
        #[arg(long, default_value_t = domain::DEFAULT_OFFSET)]
        offset: u64,
        #[arg(long, default_value_t = domain::DEFAULT_LIMIT)]
        limit: u64,
    },
    /// Find users by column values
    Find(UserFilterArgs),
    /// Update a user from a JSON object, e.g. '{"name": "Ada"}'
    Update {
        id: Uuid,
        /// JSON object of column values
        #[arg(long)]
        data: String,
        /// Reject fields the user table does not have
        #[arg(long)]
        strict: bool,
    },
    /// Delete a user by ID
    Delete { id: Uuid },
    /// Delete every user matching the filters
    Purge(UserFilterArgs),
}
