//! Common utilities shared across the workspace.
//!
//! This crate provides:
//! - Unified, status-coded error handling with HTTP rendering
//! - Configuration structures
//! - Tracing bootstrap

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
pub use telemetry::init_tracing;
