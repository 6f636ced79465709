//! Error types for dictionary operations.

use dictionary_types::{EntityId, Locale};
use thiserror::Error;

use crate::repository::EntityKind;

/// A single broken rule found while validating an entity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The concept has no (non-voided) names.
    #[error("concept must have at least one name")]
    MissingName,

    /// A name is empty after trimming.
    #[error("name in locale {locale} is blank")]
    BlankName {
        /// Locale of the blank name.
        locale: Locale,
    },

    /// The concept has no datatype.
    #[error("concept datatype is required")]
    MissingDatatype,

    /// The concept has no class.
    #[error("concept class is required")]
    MissingClass,

    /// Two names of the same locale are both fully specified.
    #[error("locale {locale} has more than one fully specified name")]
    DuplicateFullySpecifiedName {
        /// The conflicting locale.
        locale: Locale,
    },

    /// Two names of the same locale are both marked preferred.
    #[error("locale {locale} has more than one preferred name")]
    DuplicatePreferredName {
        /// The conflicting locale.
        locale: Locale,
    },

    /// The entity is retired but no reason is recorded.
    #[error("retire reason is required for a retired {kind}")]
    MissingRetireReason {
        /// Kind of the retired entity.
        kind: EntityKind,
    },

    /// A set concept lists itself as a member.
    #[error("concept {concept} cannot be a member of itself")]
    SetContainsItself {
        /// The offending concept.
        concept: EntityId,
    },

    /// A drug has a blank name.
    #[error("drug name is required")]
    BlankDrugName,

    /// A reference term has a blank code.
    #[error("reference term code is required")]
    BlankTermCode,

    /// A referenced entity does not exist in the repository.
    #[error("referenced {kind} {id} does not exist")]
    Dangling {
        /// Kind of the missing entity.
        kind: EntityKind,
        /// Identifier that could not be resolved.
        id: EntityId,
    },
}

/// Aggregate validation failure listing every violated rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} failed validation: {}", join_violations(.violations))]
pub struct ValidationErrors {
    /// Kind of the entity that failed validation.
    pub kind: EntityKind,
    /// All violations found, in check order.
    pub violations: Vec<Violation>,
}

impl ValidationErrors {
    /// Returns true if the given violation is part of this failure.
    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation)
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by a [`Repository`](crate::Repository) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Delete of an entity that is not stored.
    #[error("{kind} {id} does not exist")]
    Missing {
        /// Kind of the entity.
        kind: EntityKind,
        /// Identifier that was not found.
        id: EntityId,
    },

    /// Delete of an entity that was never saved.
    #[error("{kind} has no id")]
    Unsaved {
        /// Kind of the entity.
        kind: EntityKind,
    },

    /// A stored row could not be read back as the requested type.
    #[error("stored {kind} row has an unexpected type")]
    TypeMismatch {
        /// Kind of the entity.
        kind: EntityKind,
    },

    /// Backend failure.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors surfaced by the lifecycle and query services.
#[derive(Error, Debug)]
pub enum DictionaryError {
    /// The caller passed a structurally invalid input.
    #[error("{0}")]
    IllegalArgument(String),

    /// The entity, after normalization, still violates domain rules.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The operation is blocked because the entity is referenced elsewhere.
    #[error("{0}")]
    Conflict(String),

    /// A mutation targeted an entity that does not exist.
    #[error("{kind} not found: {}", describe_id(.id))]
    NotFound {
        /// Kind of the missing entity.
        kind: EntityKind,
        /// Identifier, or `None` for an unsaved entity.
        id: Option<EntityId>,
    },

    /// The repository collaborator failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn describe_id(id: &Option<EntityId>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "unsaved".to_string(),
    }
}

impl DictionaryError {
    /// Returns the validation failure carried by this error, if any.
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type for dictionary operations.
pub type DictionaryResult<T> = Result<T, DictionaryError>;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
