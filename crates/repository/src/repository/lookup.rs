//! Lookup operations.

use common::{AppError, AppResult};
use domain::{Entity, Filters, Window};
use tracing::debug;

use super::{Found, Repository};
use crate::guard::OpResult;
use crate::session::{Query, UnitOfWork};

impl<E: Entity> Repository<E> {
    /// Find an entity by identifier.
    ///
    /// A miss raises `NotFound` unless `raise_if_not_found` is false, in
    /// which case `None` is returned.
    pub async fn find_by_id<S>(
        &self,
        session: &mut S,
        id: &E::Id,
        raise_if_not_found: bool,
    ) -> AppResult<Option<E>>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let outcome = self.lookup_id(session, id, raise_if_not_found).await;
        self.read_guard("Error finding entity by ID")
            .settle::<E, _, _>(session, outcome)
            .await
    }

    /// Find a window of entities in storage order
    pub async fn find_all<S>(&self, session: &mut S, window: Window) -> AppResult<Vec<E>>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let outcome = self.lookup_window(session, window).await;
        self.read_guard("Error finding all entities")
            .settle::<E, _, _>(session, outcome)
            .await
    }

    /// Find entities matching every filter term.
    ///
    /// Several matches always come back as `Found::Many`, before the
    /// not-found check and regardless of `return_as_list`.
    pub async fn find_by<S>(
        &self,
        session: &mut S,
        filters: &Filters,
        raise_if_not_found: bool,
        return_as_list: bool,
    ) -> AppResult<Found<E>>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let outcome = self
            .lookup_filters(session, filters, raise_if_not_found, return_as_list)
            .await;
        self.read_guard("Error finding entity by filters")
            .settle::<E, _, _>(session, outcome)
            .await
    }

    pub(super) async fn lookup_id<S>(
        &self,
        session: &mut S,
        id: &E::Id,
        raise_if_not_found: bool,
    ) -> OpResult<Option<E>>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let entity = session.first(&Query::new().filter_by_id(id)).await?;
        debug!(
            "{} found by ID {}: {}",
            E::NAME,
            id,
            entity
                .as_ref()
                .map_or_else(|| "None".to_string(), |e| e.display().to_string())
        );

        if raise_if_not_found && entity.is_none() {
            let detail = format!("{} not found with ID {}", E::NAME, id);
            return Err(AppError::not_found(detail).into());
        }
        Ok(entity)
    }

    async fn lookup_window<S>(&self, session: &mut S, window: Window) -> OpResult<Vec<E>>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let query = Query::new().offset(window.offset).limit(window.limit);
        let entities = session.all(&query).await?;
        debug!(
            "{} entities found with offset {} and limit {}: {}",
            E::NAME,
            window.offset,
            window.limit,
            entities.len()
        );
        Ok(entities)
    }

    async fn lookup_filters<S>(
        &self,
        session: &mut S,
        filters: &Filters,
        raise_if_not_found: bool,
        return_as_list: bool,
    ) -> OpResult<Found<E>>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let mut entities = session.all(&Query::new().filter(filters)).await?;
        debug!(
            "{} found with filters {}: {} match(es)",
            E::NAME,
            filters,
            entities.len()
        );

        if entities.len() > 1 {
            return Ok(Found::Many(entities));
        }

        if raise_if_not_found && entities.is_empty() {
            return Err(AppError::not_found(format!("{} not found", E::NAME)).into());
        }

        if return_as_list {
            return Ok(Found::Many(entities));
        }
        Ok(entities.pop().map_or(Found::Nothing, Found::One))
    }
}
