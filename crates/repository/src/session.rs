//! Unit of Work contract.
//!
//! A session batches entity changes until a single commit/rollback
//! boundary. It is request-scoped, owned by the caller and passed as
//! `&mut` into every repository operation, so it is never shared between
//! concurrent callers.
//!
//! Entities returned by a query, or handed to `add`, become *tracked*.
//! Because entities are plain values, in-memory edits to a tracked entity
//! reach the session only through `merge`.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use domain::{Entity, FieldValue, Filters, ID_COLUMN};

use crate::error::StoreResult;

/// Unit of Work trait for dependency injection.
#[async_trait]
pub trait UnitOfWork<E: Entity>: Send {
    /// Run a query, pending changes included, in storage order
    async fn all(&mut self, query: &Query<E>) -> StoreResult<Vec<E>>;

    /// First row of a query
    async fn first(&mut self, query: &Query<E>) -> StoreResult<Option<E>> {
        let limit = query.limit_value().map_or(1, |limit| limit.min(1));
        let query = query.clone().limit(limit);
        Ok(self.all(&query).await?.into_iter().next())
    }

    /// Stage a new entity for insertion and start tracking it
    fn add(&mut self, entity: E);

    /// Stage the current state of a tracked entity
    fn merge(&mut self, entity: &E);

    /// Stage a deletion
    fn delete(&mut self, entity: &E);

    /// Apply every pending change atomically
    async fn commit(&mut self) -> StoreResult<()>;

    /// Discard pending changes and restore the last committed tracking state
    async fn rollback(&mut self) -> StoreResult<()>;

    /// Reload an entity's state from storage
    async fn refresh(&mut self, entity: &mut E) -> StoreResult<()>;

    fn is_tracked(&self, entity: &E) -> bool;

    /// Start a query builder bound to this session
    fn query(&mut self) -> QueryBuilder<'_, E, Self>
    where
        Self: Sized,
    {
        QueryBuilder::new(self)
    }
}

/// Opens a fresh session per unit of work.
pub trait SessionFactory<E: Entity>: Send + Sync {
    type Session: UnitOfWork<E>;

    fn open(&self) -> Self::Session;
}

/// A pending change recorded by a session
#[derive(Debug, Clone)]
pub(crate) enum Change<E> {
    Insert(E),
    Update(E),
    Remove(E),
}

// =============================================================================
// Queries
// =============================================================================

/// Equality-filtered, windowed selection of entities
pub struct Query<E: Entity> {
    filters: Filters,
    offset: Option<u64>,
    limit: Option<u64>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Query<E> {
    pub fn new() -> Self {
        Self {
            filters: Filters::new(),
            offset: None,
            limit: None,
            _entity: PhantomData,
        }
    }

    pub fn filter_eq(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filters = self.filters.eq(column, value);
        self
    }

    pub fn filter_by_id(self, id: &E::Id) -> Self {
        self.filter_eq(ID_COLUMN, id.clone())
    }

    /// Add every term of a filter set
    pub fn filter(mut self, filters: &Filters) -> Self {
        for (column, value) in filters.iter() {
            self.filters = self.filters.eq(column, value.clone());
        }
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }
}

impl<E: Entity> Default for Query<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Clone for Query<E> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            offset: self.offset,
            limit: self.limit,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for Query<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("entity", &E::NAME)
            .field("filters", &self.filters)
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .finish()
    }
}

/// Query builder borrowing a session, finished with `first` or `all`
pub struct QueryBuilder<'s, E: Entity, S: UnitOfWork<E> + ?Sized> {
    session: &'s mut S,
    query: Query<E>,
}

impl<'s, E: Entity, S: UnitOfWork<E> + ?Sized> QueryBuilder<'s, E, S> {
    pub fn new(session: &'s mut S) -> Self {
        Self {
            session,
            query: Query::new(),
        }
    }

    pub fn filter_eq(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.query = self.query.filter_eq(column, value);
        self
    }

    pub fn filter_by_id(mut self, id: &E::Id) -> Self {
        self.query = self.query.filter_by_id(id);
        self
    }

    pub fn filter(mut self, filters: &Filters) -> Self {
        self.query = self.query.filter(filters);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.query = self.query.offset(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.query = self.query.limit(limit);
        self
    }

    pub async fn first(self) -> StoreResult<Option<E>> {
        self.session.first(&self.query).await
    }

    pub async fn all(self) -> StoreResult<Vec<E>> {
        self.session.all(&self.query).await
    }
}
