//! In-process storage and session.
//!
//! `InMemoryStore` plays the role of the database: rows kept in insertion
//! order behind a shared lock, so several sessions can point at the same
//! storage. `InMemorySession` is a full Unit of Work over it with pending
//! changes, atomic commit and identity tracking. Failures can be scheduled
//! on the store to exercise rollback paths.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use domain::{Entity, Filters};

use crate::error::{StoreError, StoreResult};
use crate::session::{Change, Query, SessionFactory, UnitOfWork};

struct StoreState<E> {
    rows: Vec<E>,
    query_fault: Option<String>,
    commit_fault: Option<String>,
}

/// Shared in-memory table for one entity type
pub struct InMemoryStore<E: Entity> {
    state: Arc<Mutex<StoreState<E>>>,
}

impl<E: Entity> Clone for InMemoryStore<E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<E: Entity> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> InMemoryStore<E> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Store pre-populated with committed rows
    pub fn with_rows(rows: impl IntoIterator<Item = E>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                rows: rows.into_iter().collect(),
                query_fault: None,
                commit_fault: None,
            })),
        }
    }

    /// Open a new session over this store
    pub fn session(&self) -> InMemorySession<E> {
        InMemorySession::new(self.clone())
    }

    /// Snapshot of the committed rows
    pub fn rows(&self) -> Vec<E> {
        self.lock().rows.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().rows.is_empty()
    }

    /// Make the next query against this store fail
    pub fn fail_next_query(&self, reason: impl Into<String>) {
        self.lock().query_fault = Some(reason.into());
    }

    /// Make the next commit against this store fail
    pub fn fail_next_commit(&self, reason: impl Into<String>) {
        self.lock().commit_fault = Some(reason.into());
    }

    // A panic while holding the lock cannot leave rows half-written: every
    // mutation replaces the row vector in one assignment.
    fn lock(&self) -> MutexGuard<'_, StoreState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Unit of Work over an [`InMemoryStore`]
pub struct InMemorySession<E: Entity> {
    store: InMemoryStore<E>,
    pending: Vec<Change<E>>,
    tracked: Vec<E::Id>,
    committed: Vec<E::Id>,
}

impl<E: Entity> InMemorySession<E> {
    pub fn new(store: InMemoryStore<E>) -> Self {
        Self {
            store,
            pending: Vec::new(),
            tracked: Vec::new(),
            committed: Vec::new(),
        }
    }

    pub fn store(&self) -> &InMemoryStore<E> {
        &self.store
    }

    /// Number of changes waiting for commit
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Committed rows with pending changes laid over them
    fn view(&self, committed_rows: Vec<E>) -> Vec<E> {
        let mut rows = committed_rows;
        for change in &self.pending {
            match change {
                Change::Insert(entity) | Change::Update(entity) => upsert(&mut rows, entity),
                Change::Remove(entity) => {
                    let id = entity.id();
                    rows.retain(|row| row.id() != id);
                }
            }
        }
        rows
    }

    fn track(&mut self, id: E::Id) {
        if !self.tracked.contains(&id) {
            self.tracked.push(id);
        }
    }

    fn untrack(&mut self, id: &E::Id) {
        self.tracked.retain(|tracked| tracked != id);
    }
}

fn upsert<E: Entity>(rows: &mut Vec<E>, entity: &E) {
    let id = entity.id();
    match rows.iter_mut().find(|row| row.id() == id) {
        Some(slot) => *slot = entity.clone(),
        None => rows.push(entity.clone()),
    }
}

fn validate<E: Entity>(filters: &Filters) -> StoreResult<()> {
    match filters.iter().find(|(column, _)| E::column(column).is_none()) {
        Some((column, _)) => Err(StoreError::unknown_column(E::NAME, column)),
        None => Ok(()),
    }
}

fn matches<E: Entity>(entity: &E, filters: &Filters) -> bool {
    filters
        .iter()
        .all(|(column, expected)| entity.get(column).as_ref() == Some(expected))
}

/// Apply pending changes to a copy of the committed rows, failing on the
/// first change storage would reject.
fn apply<E: Entity>(committed_rows: &[E], pending: &[Change<E>]) -> StoreResult<Vec<E>> {
    let mut rows = committed_rows.to_vec();
    for change in pending {
        match change {
            Change::Insert(entity) => {
                let id = entity.id();
                if rows.iter().any(|row| row.id() == id) {
                    return Err(StoreError::DuplicateKey {
                        entity: E::NAME,
                        id: id.to_string(),
                    });
                }
                rows.push(entity.clone());
            }
            Change::Update(entity) => {
                let id = entity.id();
                match rows.iter_mut().find(|row| row.id() == id) {
                    Some(slot) => *slot = entity.clone(),
                    None => return Err(StoreError::detached(entity.display().to_string())),
                }
            }
            Change::Remove(entity) => {
                let id = entity.id();
                match rows.iter().position(|row| row.id() == id) {
                    Some(index) => {
                        rows.remove(index);
                    }
                    None => return Err(StoreError::detached(entity.display().to_string())),
                }
            }
        }
    }
    Ok(rows)
}

impl<E: Entity> SessionFactory<E> for InMemoryStore<E> {
    type Session = InMemorySession<E>;

    fn open(&self) -> InMemorySession<E> {
        self.session()
    }
}

#[async_trait]
impl<E: Entity> UnitOfWork<E> for InMemorySession<E> {
    async fn all(&mut self, query: &Query<E>) -> StoreResult<Vec<E>> {
        let committed_rows = {
            let mut state = self.store.lock();
            if let Some(reason) = state.query_fault.take() {
                return Err(StoreError::Injected(reason));
            }
            state.rows.clone()
        };
        validate::<E>(query.filters())?;

        let offset = query.offset_value().unwrap_or(0) as usize;
        let limit = query.limit_value().map_or(usize::MAX, |limit| limit as usize);
        let found: Vec<E> = self
            .view(committed_rows.clone())
            .into_iter()
            .filter(|row| matches(row, query.filters()))
            .skip(offset)
            .take(limit)
            .collect();

        for row in &found {
            let id = row.id();
            if committed_rows.iter().any(|c| c.id() == id) && !self.committed.contains(&id) {
                self.committed.push(id.clone());
            }
            self.track(id);
        }
        Ok(found)
    }

    fn add(&mut self, entity: E) {
        self.track(entity.id());
        self.pending.push(Change::Insert(entity));
    }

    fn merge(&mut self, entity: &E) {
        self.track(entity.id());
        self.pending.push(Change::Update(entity.clone()));
    }

    fn delete(&mut self, entity: &E) {
        self.untrack(&entity.id());
        self.pending.push(Change::Remove(entity.clone()));
    }

    async fn commit(&mut self) -> StoreResult<()> {
        {
            let mut state = self.store.lock();
            if let Some(reason) = state.commit_fault.take() {
                return Err(StoreError::Injected(reason));
            }
            state.rows = apply(&state.rows, &self.pending)?;
        }
        self.pending.clear();
        self.committed = self.tracked.clone();
        Ok(())
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        self.pending.clear();
        self.tracked = self.committed.clone();
        Ok(())
    }

    async fn refresh(&mut self, entity: &mut E) -> StoreResult<()> {
        let query = Query::new().filter_by_id(&entity.id());
        match self.first(&query).await? {
            Some(fresh) => {
                *entity = fresh;
                Ok(())
            }
            None => Err(StoreError::detached(entity.display().to_string())),
        }
    }

    fn is_tracked(&self, entity: &E) -> bool {
        self.tracked.contains(&entity.id())
    }
}
