//! Error-translating operation guard.
//!
//! Every repository operation runs its body to completion and then hands
//! the outcome to a [`Guard`]. The guard is the single place where
//! persistence failures are rolled back, logged with context and turned
//! into caller-visible errors (or swallowed into an absence value).

use common::AppError;
use domain::{DomainError, Entity};
use tracing::{error, warn};

use crate::error::StoreError;
use crate::session::UnitOfWork;

/// Why an operation body stopped
#[derive(Debug)]
pub enum Failure {
    /// The storage failed
    Store(StoreError),
    /// The operation refused the request (not found, conflict, bad field)
    Rejected(AppError),
}

impl From<StoreError> for Failure {
    fn from(err: StoreError) -> Self {
        Failure::Store(err)
    }
}

impl From<AppError> for Failure {
    fn from(err: AppError) -> Self {
        Failure::Rejected(err)
    }
}

impl From<DomainError> for Failure {
    fn from(err: DomainError) -> Self {
        Failure::Rejected(err.into())
    }
}

/// Outcome of an operation body
pub type OpResult<T> = Result<T, Failure>;

/// Value returned instead of raising when a persistence failure is tolerated
pub trait Absent {
    fn absent() -> Self;
}

impl<T> Absent for Option<T> {
    fn absent() -> Self {
        None
    }
}

impl<T> Absent for Vec<T> {
    fn absent() -> Self {
        Vec::new()
    }
}

impl Absent for bool {
    fn absent() -> Self {
        false
    }
}

impl Absent for u64 {
    fn absent() -> Self {
        0
    }
}

/// Whether an operation stages changes in the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Read,
    Write,
}

/// Per-call-site error policy
#[derive(Debug, Clone, Copy)]
pub struct Guard {
    detail: &'static str,
    effect: Effect,
    raise_on_error: bool,
}

impl Guard {
    pub fn read(detail: &'static str) -> Self {
        Self {
            detail,
            effect: Effect::Read,
            raise_on_error: true,
        }
    }

    pub fn write(detail: &'static str) -> Self {
        Self {
            detail,
            effect: Effect::Write,
            raise_on_error: true,
        }
    }

    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = raise;
        self
    }

    /// Settle an outcome, swallowing persistence failures into
    /// `T::absent()` when the guard does not raise.
    pub async fn settle<E, S, T>(self, session: &mut S, outcome: OpResult<T>) -> Result<T, AppError>
    where
        E: Entity,
        S: UnitOfWork<E> + ?Sized,
        T: Absent,
    {
        match self.intercept::<E, S, T>(session, outcome).await {
            Err(AppError::Persistence(_)) if !self.raise_on_error => {
                warn!("{}: returning absence value", self.detail);
                Ok(T::absent())
            }
            other => other,
        }
    }

    /// Settle an outcome whose type has no absence value. Persistence
    /// failures always raise.
    pub async fn settle_or_raise<E, S, T>(
        self,
        session: &mut S,
        outcome: OpResult<T>,
    ) -> Result<T, AppError>
    where
        E: Entity,
        S: UnitOfWork<E> + ?Sized,
    {
        self.intercept::<E, S, T>(session, outcome).await
    }

    async fn intercept<E, S, T>(&self, session: &mut S, outcome: OpResult<T>) -> Result<T, AppError>
    where
        E: Entity,
        S: UnitOfWork<E> + ?Sized,
    {
        match outcome {
            Ok(value) => Ok(value),
            Err(Failure::Store(err)) => {
                let detail = format!("{}: {}", self.detail, err);
                error!("{}", detail);
                self.rollback::<E, S>(session).await;
                Err(AppError::Persistence(detail))
            }
            Err(Failure::Rejected(err)) => {
                if self.effect == Effect::Write {
                    self.rollback::<E, S>(session).await;
                }
                Err(err)
            }
        }
    }

    async fn rollback<E, S>(&self, session: &mut S)
    where
        E: Entity,
        S: UnitOfWork<E> + ?Sized,
    {
        if let Err(rollback_err) = session.rollback().await {
            error!("Session rollback failed: {}", rollback_err);
        }
    }
}
