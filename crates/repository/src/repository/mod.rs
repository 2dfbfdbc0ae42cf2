//! Generic entity repository.
//!
//! `Repository<E>` gives any [`Entity`] the full set of persistence
//! operations: lookups, deletions, existence and conflict checks, save and
//! update. Each operation takes the Unit of Work as its first argument,
//! runs its body and settles the outcome through a [`Guard`].
//!
//! [`Guard`]: crate::guard::Guard

use std::fmt;
use std::marker::PhantomData;

use common::RepositoryConfig;
use domain::{Entity, FieldValue, Window};

use crate::guard::{Absent, Guard};

mod checks;
mod delete;
mod lookup;
mod mutate;

/// Persistence operations for entity type `E`
pub struct Repository<E: Entity> {
    config: RepositoryConfig,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    pub fn new() -> Self {
        Self::from_config(RepositoryConfig::default())
    }

    pub fn from_config(config: RepositoryConfig) -> Self {
        Self {
            config,
            _entity: PhantomData,
        }
    }

    /// Copy of this repository that returns absence values instead of
    /// raising on persistence failures
    pub fn lenient(&self) -> Self {
        Self::from_config(RepositoryConfig {
            raise_on_error: false,
            ..self.config.clone()
        })
    }

    /// Copy of this repository that raises on persistence failures
    pub fn raising(&self) -> Self {
        Self::from_config(RepositoryConfig {
            raise_on_error: true,
            ..self.config.clone()
        })
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Window starting at the first row, sized by the configured limit
    pub fn default_window(&self) -> Window {
        Window::first(self.config.default_limit)
    }

    fn read_guard(&self, detail: &'static str) -> Guard {
        Guard::read(detail).raise_on_error(self.config.raise_on_error)
    }

    /// Guard for operations that also roll back when they reject a request
    fn write_guard(&self, detail: &'static str) -> Guard {
        Guard::write(detail).raise_on_error(self.config.raise_on_error)
    }
}

impl<E: Entity> Default for Repository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self::from_config(self.config.clone())
    }
}

impl<E: Entity> fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &E::NAME)
            .field("config", &self.config)
            .finish()
    }
}

// =============================================================================
// Operation results
// =============================================================================

/// Result of `find_by`
#[derive(Debug, Clone, PartialEq)]
pub enum Found<E> {
    /// No match, single result requested
    Nothing,
    /// Exactly one match, single result requested
    One(E),
    /// Several matches, or a list was requested
    Many(Vec<E>),
}

impl<E> Found<E> {
    /// All matched entities, whatever the shape
    pub fn into_vec(self) -> Vec<E> {
        match self {
            Found::Nothing => Vec::new(),
            Found::One(entity) => vec![entity],
            Found::Many(entities) => entities,
        }
    }

    /// The single entity, if the result is `One`
    pub fn one(self) -> Option<E> {
        match self {
            Found::One(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Found::Nothing => 0,
            Found::One(_) => 1,
            Found::Many(entities) => entities.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Absent for Found<E> {
    fn absent() -> Self {
        Found::Nothing
    }
}

/// Result of `exists`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    /// The expectation holds
    Satisfied,
    /// A match exists although `should_exist` asked to check for one
    UnexpectedPresence,
    /// No match exists although `should_exist` was false
    UnexpectedAbsence,
}

impl Existence {
    /// Numeric signal: 0 satisfied, 1 unexpected presence, 2 unexpected absence
    pub fn code(self) -> u8 {
        match self {
            Existence::Satisfied => 0,
            Existence::UnexpectedPresence => 1,
            Existence::UnexpectedAbsence => 2,
        }
    }

    pub fn is_satisfied(self) -> bool {
        self == Existence::Satisfied
    }
}

impl Absent for Existence {
    fn absent() -> Self {
        Existence::Satisfied
    }
}

/// Field/value pair checked by `exists` and `conflict`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCheck {
    field: String,
    value: FieldValue,
    label: Option<String>,
}

impl FieldCheck {
    pub fn new(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            label: None,
        }
    }

    /// Human-readable field name used in details instead of the column name
    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Label, defaulting to the column name with underscores as spaces
    pub fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.field.replace('_', " "))
    }
}
