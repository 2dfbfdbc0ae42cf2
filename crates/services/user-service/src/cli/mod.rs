//! CLI module - Command-line interface for the user service.
//!
//! Provides commands for:
//! - `migrate` - Database migrations
//! - `user` - User management through the entity repository

pub mod args;

pub use args::{Cli, Commands};
