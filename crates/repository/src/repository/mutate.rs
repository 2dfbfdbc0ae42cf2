//! Save, update and delete of a single entity.

use common::{AppError, AppResult};
use domain::{Entity, IntoPatch};
use tracing::{debug, error, info, warn};

use super::Repository;
use crate::guard::OpResult;
use crate::session::UnitOfWork;

impl<E: Entity> Repository<E> {
    /// Persist the entity and return its refreshed state.
    ///
    /// An untracked entity is added to the session; a tracked one has its
    /// in-memory state merged. The session is committed and `entity` is
    /// reloaded from storage.
    pub async fn save<S>(&self, session: &mut S, entity: &mut E) -> AppResult<E>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let outcome = self.persist(session, entity).await;
        self.write_guard("Error saving entity")
            .settle_or_raise::<E, _, _>(session, outcome)
            .await
    }

    /// Apply a payload to the entity's columns, then save it.
    ///
    /// Keys in `excluded_fields` are dropped from the payload first. Keys
    /// naming no column are skipped (an error in `strict_mode`), nulls for
    /// nullable columns are skipped, and a value that does not fit its
    /// column fails with `Internal`. Keys applied before a failing key stay
    /// assigned on `entity`; nothing reaches the session.
    pub async fn update<S, P>(
        &self,
        session: &mut S,
        entity: &mut E,
        patch: P,
        excluded_fields: &[&str],
        strict_mode: bool,
    ) -> AppResult<E>
    where
        S: UnitOfWork<E> + ?Sized,
        P: IntoPatch + Send,
    {
        let outcome = self.apply_patch(entity, patch, excluded_fields, strict_mode);
        self.write_guard("Error updating entity")
            .settle_or_raise::<E, _, _>(session, outcome)
            .await?;
        self.save(session, entity).await
    }

    /// Delete the entity and commit
    pub async fn delete<S>(&self, session: &mut S, entity: &E) -> AppResult<bool>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let outcome = self.remove(session, entity).await;
        self.write_guard("Error deleting entity")
            .settle::<E, _, _>(session, outcome)
            .await
    }

    async fn persist<S>(&self, session: &mut S, entity: &mut E) -> OpResult<E>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        debug!("Saving {}: {}", E::NAME, entity.display());
        if session.is_tracked(entity) {
            debug!("{} is already part of the session, merging it", entity.display());
            session.merge(entity);
        } else {
            debug!("{} is not part of the session, adding it", entity.display());
            session.add(entity.clone());
        }

        session.commit().await?;
        session.refresh(entity).await?;
        info!("{} saved: {}", E::NAME, entity.display());
        Ok(entity.clone())
    }

    fn apply_patch<P: IntoPatch>(
        &self,
        entity: &mut E,
        patch: P,
        excluded_fields: &[&str],
        strict_mode: bool,
    ) -> OpResult<()> {
        let mut patch = patch.into_patch()?;

        for excluded in excluded_fields {
            if patch.remove(excluded).is_none() {
                let detail = format!("There is no such key '{}', continuing", excluded);
                warn!("{}", detail);
                if strict_mode {
                    return Err(AppError::internal(detail).into());
                }
            }
        }

        for (key, value) in patch {
            debug!("Updating {}.{} = {}", E::NAME, key, value);
            let Some(column) = E::column(&key) else {
                let detail = format!("{} does not have field '{}'", E::NAME, key);
                error!("{}", detail);
                if strict_mode {
                    return Err(AppError::internal(detail).into());
                }
                continue;
            };

            if column.nullable && value.is_null() {
                continue;
            }

            let value = value.conform(column.column_type).map_err(|rejected| {
                let detail = format!(
                    "Invalid type for field '{}.{}': expected {}, got {}",
                    E::NAME,
                    key,
                    column.column_type,
                    rejected.type_name()
                );
                error!("{}", detail);
                AppError::internal(detail)
            })?;
            entity.set(&key, value)?;
        }
        Ok(())
    }

    async fn remove<S>(&self, session: &mut S, entity: &E) -> OpResult<bool>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        session.delete(entity);
        session.commit().await?;
        info!("{} deleted: {}", E::NAME, entity.display());
        Ok(true)
    }
}
