//! SeaORM entities.

pub mod user;

/// A persisted user row
pub type User = user::Model;
