//! Deletion by identifier and by filters.

use common::{AppError, AppResult};
use domain::{Entity, Filters};
use tracing::{debug, info, warn};

use super::Repository;
use crate::guard::OpResult;
use crate::session::{Query, UnitOfWork};

impl<E: Entity> Repository<E> {
    /// Delete the entity with the given identifier and commit.
    ///
    /// Returns `false` when nothing matched and `raise_if_not_found` is off.
    pub async fn delete_by_id<S>(
        &self,
        session: &mut S,
        id: &E::Id,
        raise_if_not_found: bool,
    ) -> AppResult<bool>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let outcome = self.remove_id(session, id, raise_if_not_found).await;
        self.write_guard("Error deleting entity by ID")
            .settle::<E, _, _>(session, outcome)
            .await
    }

    /// Delete every entity matching the filters in one commit and return
    /// how many were deleted.
    pub async fn delete_by<S>(
        &self,
        session: &mut S,
        filters: &Filters,
        raise_if_not_found: bool,
    ) -> AppResult<u64>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let outcome = self.remove_matching(session, filters, raise_if_not_found).await;
        self.write_guard("Error deleting entities by filters")
            .settle::<E, _, _>(session, outcome)
            .await
    }

    async fn remove_id<S>(
        &self,
        session: &mut S,
        id: &E::Id,
        raise_if_not_found: bool,
    ) -> OpResult<bool>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let entity = session.first(&Query::new().filter_by_id(id)).await?;
        let Some(entity) = entity else {
            if raise_if_not_found {
                let detail = format!("{} not found with ID {}", E::NAME, id);
                return Err(AppError::not_found(detail).into());
            }
            warn!("{} not found by ID {}, skip deletion", E::NAME, id);
            return Ok(false);
        };

        debug!("Deleting {} by ID {}: {}", E::NAME, id, entity.display());
        session.delete(&entity);
        session.commit().await?;
        info!("{} deleted by ID {}", E::NAME, id);
        Ok(true)
    }

    async fn remove_matching<S>(
        &self,
        session: &mut S,
        filters: &Filters,
        raise_if_not_found: bool,
    ) -> OpResult<u64>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let entities = session.all(&Query::new().filter(filters)).await?;
        debug!(
            "{} found with filters {}: {} match(es)",
            E::NAME,
            filters,
            entities.len()
        );

        if raise_if_not_found && entities.is_empty() {
            return Err(AppError::not_found(format!("{} not found", E::NAME)).into());
        }

        for entity in &entities {
            session.delete(entity);
        }
        session.commit().await?;
        info!("{} deleted with filters {}", E::NAME, filters);
        Ok(entities.len() as u64)
    }
}
