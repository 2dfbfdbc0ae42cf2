//! Existence and conflict checks on unique-ish fields.

use common::{AppError, AppResult};
use domain::Entity;
use tracing::info;

use super::{Existence, FieldCheck, Repository};
use crate::guard::OpResult;
use crate::session::{Query, UnitOfWork};

impl<E: Entity> Repository<E> {
    /// Verify a presence/absence expectation on a field.
    ///
    /// With `should_exist` set, a match is unexpected and reported as a
    /// conflict. Without it, a missing match is reported as not found.
    /// `raise_error` off turns both into the returned [`Existence`].
    pub async fn exists<S>(
        &self,
        session: &mut S,
        should_exist: bool,
        check: &FieldCheck,
        raise_error: bool,
    ) -> AppResult<Existence>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let outcome = self.check_existence(session, should_exist, check, raise_error).await;
        self.write_guard("Error checking existence of entity")
            .settle::<E, _, _>(session, outcome)
            .await
    }

    /// Whether another entity (id different from `id`) already holds the
    /// checked value. Raises `Conflict` instead of returning `true` when
    /// `raise_error` is set.
    pub async fn conflict<S>(
        &self,
        session: &mut S,
        id: &E::Id,
        check: &FieldCheck,
        raise_error: bool,
    ) -> AppResult<bool>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let outcome = self.check_conflict(session, id, check, raise_error).await;
        self.write_guard("Error checking existence of entity")
            .settle::<E, _, _>(session, outcome)
            .await
    }

    async fn check_existence<S>(
        &self,
        session: &mut S,
        should_exist: bool,
        check: &FieldCheck,
        raise_error: bool,
    ) -> OpResult<Existence>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let query = Query::new().filter_eq(check.field(), check.value().clone());
        let found = session.first(&query).await?.is_some();
        let subject = format!("{} with {} {}", E::NAME, check.label(), check.value());

        match (should_exist, found) {
            (true, true) => {
                let detail = format!("{} already exists", subject);
                info!("{}", detail);
                if raise_error {
                    return Err(AppError::conflict(detail).into());
                }
                Ok(Existence::UnexpectedPresence)
            }
            (false, false) => {
                let detail = format!("{} not found", subject);
                info!("{}", detail);
                if raise_error {
                    return Err(AppError::not_found(detail).into());
                }
                Ok(Existence::UnexpectedAbsence)
            }
            _ => Ok(Existence::Satisfied),
        }
    }

    async fn check_conflict<S>(
        &self,
        session: &mut S,
        id: &E::Id,
        check: &FieldCheck,
        raise_error: bool,
    ) -> OpResult<bool>
    where
        S: UnitOfWork<E> + ?Sized,
    {
        let query = Query::new().filter_eq(check.field(), check.value().clone());
        let holders = session.all(&query).await?;

        let Some(other) = holders.iter().map(E::id).find(|other| other != id) else {
            return Ok(false);
        };

        let detail = format!(
            "{} with {}={} and different ID {} found",
            E::NAME,
            check.label(),
            check.value(),
            other
        );
        info!("{}", detail);
        if raise_error {
            return Err(AppError::conflict(detail).into());
        }
        Ok(true)
    }
}
