//! Storage collaborator used by the lifecycle and query services.
//!
//! The services never touch storage directly. They go through the
//! [`Repository`] trait, which any persistence layer can implement.
//! [`InMemoryRepository`] is the reference implementation.

mod memory;

use std::fmt;

use dictionary_types::{
    Concept, ConceptClass, ConceptDatatype, ConceptMapType, ConceptNameTag, ConceptProposal,
    ConceptReferenceTerm, ConceptSource, Drug, EntityId,
};
use uuid::Uuid;

use crate::error::RepositoryResult;

pub use memory::InMemoryRepository;

/// Kinds of entity stored in the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// [`Concept`]
    Concept,
    /// [`Drug`]
    Drug,
    /// [`ConceptClass`]
    ConceptClass,
    /// [`ConceptDatatype`]
    ConceptDatatype,
    /// [`ConceptSource`]
    ConceptSource,
    /// [`ConceptMapType`]
    ConceptMapType,
    /// [`ConceptReferenceTerm`]
    ConceptReferenceTerm,
    /// [`ConceptProposal`]
    ConceptProposal,
    /// [`ConceptNameTag`]
    ConceptNameTag,
}

impl EntityKind {
    /// Returns the human-readable name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Drug => "drug",
            Self::ConceptClass => "concept class",
            Self::ConceptDatatype => "concept datatype",
            Self::ConceptSource => "concept source",
            Self::ConceptMapType => "concept map type",
            Self::ConceptReferenceTerm => "concept reference term",
            Self::ConceptProposal => "concept proposal",
            Self::ConceptNameTag => "concept name tag",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persistable dictionary entity.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Kind tag used for storage and error messages.
    const KIND: EntityKind;

    /// Repository-assigned id, `None` until first save.
    fn id(&self) -> Option<EntityId>;

    /// Assigns the repository id.
    fn set_id(&mut self, id: EntityId);

    /// Stable external identifier.
    fn uuid(&self) -> &Uuid;

    /// Whether the entity is excluded from "active only" listings.
    fn is_retired(&self) -> bool;
}

macro_rules! impl_entity {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl Entity for $ty {
                const KIND: EntityKind = EntityKind::$kind;

                fn id(&self) -> Option<EntityId> {
                    self.id
                }

                fn set_id(&mut self, id: EntityId) {
                    self.id = Some(id);
                }

                fn uuid(&self) -> &Uuid {
                    &self.uuid
                }

                fn is_retired(&self) -> bool {
                    self.retired
                }
            }
        )+
    };
}

impl_entity!(
    Drug => Drug,
    ConceptClass => ConceptClass,
    ConceptDatatype => ConceptDatatype,
    ConceptSource => ConceptSource,
    ConceptMapType => ConceptMapType,
    ConceptReferenceTerm => ConceptReferenceTerm,
    ConceptNameTag => ConceptNameTag,
);

impl Entity for Concept {
    const KIND: EntityKind = EntityKind::Concept;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    /// Also points owned set-member and answer rows at the new id.
    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
        for member in &mut self.set_members {
            member.concept_set = Some(id);
        }
        for answer in &mut self.answers {
            answer.question = Some(id);
        }
    }

    fn uuid(&self) -> &Uuid {
        &self.uuid
    }

    fn is_retired(&self) -> bool {
        self.retired
    }
}

impl Entity for ConceptProposal {
    const KIND: EntityKind = EntityKind::ConceptProposal;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn uuid(&self) -> &Uuid {
        &self.uuid
    }

    /// A proposal counts as retired once it has left the unmapped state.
    fn is_retired(&self) -> bool {
        self.is_completed()
    }
}

/// A window over a filtered, id-ordered result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    /// Number of matching rows to skip.
    pub start: usize,
    /// Maximum number of rows to return; `None` returns every remaining row.
    pub length: Option<usize>,
}

impl Page {
    /// A page covering every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// A page of at most `length` rows starting at `start`.
    pub fn new(start: usize, length: usize) -> Self {
        Self {
            start,
            length: Some(length),
        }
    }

    /// Applies this page to an already filtered iterator.
    pub fn apply<T>(&self, rows: impl Iterator<Item = T>) -> Vec<T> {
        let rows = rows.skip(self.start);
        match self.length {
            Some(length) => rows.take(length).collect(),
            None => rows.collect(),
        }
    }
}

/// Storage operations required by the dictionary services.
///
/// Implementations assign ids monotonically per [`EntityKind`] and own any
/// transaction or concurrency control.
pub trait Repository {
    /// Looks up an entity by id.
    fn find<E: Entity>(&self, id: EntityId) -> RepositoryResult<Option<E>>;

    /// Looks up an entity by uuid.
    fn find_by_uuid<E: Entity>(&self, uuid: &Uuid) -> RepositoryResult<Option<E>>;

    /// Inserts or replaces an entity, assigning an id when it has none.
    /// Returns the stored entity.
    fn upsert<E: Entity>(&mut self, entity: E) -> RepositoryResult<E>;

    /// Removes a stored entity.
    fn delete<E: Entity>(&mut self, entity: &E) -> RepositoryResult<()>;

    /// Returns entities accepted by `filter`, ascending by id, with `page`
    /// applied after filtering.
    fn query<E: Entity>(&self, filter: &dyn Fn(&E) -> bool, page: Page) -> RepositoryResult<Vec<E>>;

    /// Counts entities accepted by `filter`.
    fn count<E: Entity>(&self, filter: &dyn Fn(&E) -> bool) -> RepositoryResult<usize> {
        Ok(self.query(filter, Page::all())?.len())
    }

    /// Returns true if any other stored row references `entity`.
    fn is_referenced<E: Entity>(&self, entity: &E) -> RepositoryResult<bool>;
}
