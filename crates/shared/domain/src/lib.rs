//! Domain layer - entity contract and column values.
//!
//! This crate describes what a persistent entity looks like to generic
//! code: a static column table, dynamically typed values, equality
//! filters and update patches. It has no infrastructure dependencies.

pub mod constants;
pub mod entity;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod patch;
pub mod record;
pub mod schema;
pub mod value;

pub use constants::*;
pub use entity::{Entity, EntityDisplay, FromField};
pub use error::{DomainError, DomainResult};
pub use filter::Filters;
pub use pagination::Window;
pub use patch::{IntoPatch, Patch, Typed};
pub use record::Record;
pub use schema::{find_column, ColumnDef};
pub use value::{ColumnType, FieldValue};
