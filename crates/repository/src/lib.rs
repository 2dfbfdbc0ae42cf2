//! Repository layer - generic persistence operations over a Unit of Work.
//!
//! Contains:
//! - `UnitOfWork` session trait with its query builder
//! - `Repository<E>` operations (lookup, delete, checks, save, update)
//! - The guard translating storage failures into `AppError`
//! - In-memory and SeaORM session implementations

pub mod error;
pub mod guard;
pub mod memory;
pub mod repository;
pub mod sea;
pub mod session;

pub use error::{StoreError, StoreResult};
pub use guard::{Absent, Effect, Failure, Guard, OpResult};
pub use memory::{InMemorySession, InMemoryStore};
pub use repository::{Existence, FieldCheck, Found, Repository};
pub use sea::SeaSession;
pub use session::{Query, QueryBuilder, SessionFactory, UnitOfWork};
