//! In-memory repository.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};

use dictionary_types::{Concept, ConceptProposal, ConceptReferenceTerm, Drug, EntityId};
use uuid::Uuid;

use super::{Entity, EntityKind, Page, Repository};
use crate::error::{RepositoryError, RepositoryResult};

type Row = Box<dyn Any + Send + Sync>;

/// A [`Repository`] backed by ordered maps.
///
/// Rows are kept per [`EntityKind`], keyed by id, so every listing comes back
/// in ascending id order. Observation references to concepts are tracked as
/// counts so purge guards can be exercised without an observation store.
///
/// # Example
///
/// ```
/// use dictionary_core::{InMemoryRepository, Repository};
/// use dictionary_types::ConceptClass;
///
/// let mut repo = InMemoryRepository::new();
/// let class = repo.upsert(ConceptClass::new("Test")).unwrap();
/// assert_eq!(class.id, Some(1));
///
/// let found: Option<ConceptClass> = repo.find(1).unwrap();
/// assert_eq!(found.map(|c| c.name), Some("Test".to_string()));
/// ```
#[derive(Default)]
pub struct InMemoryRepository {
    /// Rows per kind, keyed by id.
    tables: HashMap<EntityKind, BTreeMap<EntityId, Row>>,
    /// Next id to hand out per kind.
    next_ids: HashMap<EntityKind, EntityId>,
    /// Number of observations recorded against each concept id.
    observations: BTreeMap<EntityId, usize>,
}

impl std::fmt::Debug for InMemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut counts: Vec<(EntityKind, usize)> = self
            .tables
            .iter()
            .map(|(kind, rows)| (*kind, rows.len()))
            .collect();
        counts.sort();
        f.debug_struct("InMemoryRepository")
            .field("tables", &counts)
            .field("observations", &self.observations.len())
            .finish()
    }
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an observation that uses the given concept as its question or
    /// value, blocking purge of that concept.
    pub fn record_observation(&mut self, concept_id: EntityId) {
        *self.observations.entry(concept_id).or_default() += 1;
    }

    /// Returns the number of stored rows of kind `E`.
    pub fn len<E: Entity>(&self) -> usize {
        self.tables.get(&E::KIND).map_or(0, BTreeMap::len)
    }

    /// Returns true if no rows of kind `E` are stored.
    pub fn is_empty<E: Entity>(&self) -> bool {
        self.len::<E>() == 0
    }

    fn rows<E: Entity>(&self) -> RepositoryResult<Vec<&E>> {
        let Some(table) = self.tables.get(&E::KIND) else {
            return Ok(Vec::new());
        };
        table
            .values()
            .map(|row| {
                row.downcast_ref::<E>()
                    .ok_or(RepositoryError::TypeMismatch { kind: E::KIND })
            })
            .collect()
    }

    fn any_row<E: Entity>(&self, predicate: impl Fn(&E) -> bool) -> RepositoryResult<bool> {
        Ok(self.rows::<E>()?.into_iter().any(predicate))
    }

    fn concept_is_referenced(&self, id: EntityId) -> RepositoryResult<bool> {
        if self.observations.get(&id).is_some_and(|count| *count > 0) {
            return Ok(true);
        }
        let in_other_concept = self.any_row(|concept: &Concept| {
            concept.id != Some(id)
                && (concept.set_members.iter().any(|s| s.concept == id)
                    || concept.answers.iter().any(|a| a.answer_concept == id))
        })?;
        if in_other_concept {
            return Ok(true);
        }
        let in_drug = self.any_row(|drug: &Drug| {
            drug.concept == id || drug.dosage_form == Some(id) || drug.ingredients.contains(&id)
        })?;
        if in_drug {
            return Ok(true);
        }
        self.any_row(|proposal: &ConceptProposal| {
            proposal.mapped_concept == Some(id) || proposal.obs_concept == Some(id)
        })
    }
}

impl Repository for InMemoryRepository {
    fn find<E: Entity>(&self, id: EntityId) -> RepositoryResult<Option<E>> {
        let Some(row) = self.tables.get(&E::KIND).and_then(|table| table.get(&id)) else {
            return Ok(None);
        };
        row.downcast_ref::<E>()
            .cloned()
            .map(Some)
            .ok_or(RepositoryError::TypeMismatch { kind: E::KIND })
    }

    fn find_by_uuid<E: Entity>(&self, uuid: &Uuid) -> RepositoryResult<Option<E>> {
        Ok(self
            .rows::<E>()?
            .into_iter()
            .find(|row| row.uuid() == uuid)
            .cloned())
    }

    fn upsert<E: Entity>(&mut self, mut entity: E) -> RepositoryResult<E> {
        let next_id = self.next_ids.entry(E::KIND).or_insert(1);
        let id = match entity.id() {
            Some(id) => {
                *next_id = (*next_id).max(id.saturating_add(1));
                id
            }
            None => {
                let id = *next_id;
                // The counter saturates at the top of the id space.
                let taken = self
                    .tables
                    .get(&E::KIND)
                    .is_some_and(|table| table.contains_key(&id));
                if taken {
                    return Err(RepositoryError::Storage(format!(
                        "{} ids exhausted",
                        E::KIND
                    )));
                }
                *next_id = id.saturating_add(1);
                id
            }
        };
        entity.set_id(id);
        self.tables
            .entry(E::KIND)
            .or_default()
            .insert(id, Box::new(entity.clone()));
        Ok(entity)
    }

    fn delete<E: Entity>(&mut self, entity: &E) -> RepositoryResult<()> {
        let id = entity
            .id()
            .ok_or(RepositoryError::Unsaved { kind: E::KIND })?;
        self.tables
            .get_mut(&E::KIND)
            .and_then(|table| table.remove(&id))
            .map(|_| ())
            .ok_or(RepositoryError::Missing { kind: E::KIND, id })
    }

    fn query<E: Entity>(&self, filter: &dyn Fn(&E) -> bool, page: Page) -> RepositoryResult<Vec<E>> {
        let rows = self.rows::<E>()?;
        Ok(page.apply(rows.into_iter().filter(|row| filter(*row)).cloned()))
    }

    fn is_referenced<E: Entity>(&self, entity: &E) -> RepositoryResult<bool> {
        let Some(id) = entity.id() else {
            return Ok(false);
        };
        match E::KIND {
            EntityKind::Concept => self.concept_is_referenced(id),
            EntityKind::Drug => self.any_row(|concept: &Concept| {
                concept.answers.iter().any(|a| a.answer_drug == Some(id))
            }),
            EntityKind::ConceptClass => {
                self.any_row(|concept: &Concept| concept.concept_class == Some(id))
            }
            EntityKind::ConceptDatatype => {
                self.any_row(|concept: &Concept| concept.datatype == Some(id))
            }
            EntityKind::ConceptSource => {
                self.any_row(|term: &ConceptReferenceTerm| term.source == id)
            }
            EntityKind::ConceptMapType => self.any_row(|concept: &Concept| {
                concept.mappings.iter().any(|m| m.map_type == id)
            }),
            EntityKind::ConceptReferenceTerm => self.any_row(|concept: &Concept| {
                concept.mappings.iter().any(|m| m.term == id)
            }),
            EntityKind::ConceptNameTag => self.any_row(|concept: &Concept| {
                concept.names.iter().any(|n| n.has_tag(id))
            }),
            EntityKind::ConceptProposal => Ok(false),
        }
    }
}
