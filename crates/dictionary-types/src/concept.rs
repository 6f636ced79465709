//! Concept type and the rows it owns.
//!
//! A [`Concept`] owns its names, descriptions, set members, answers and
//! reference-term mappings. Other concepts are referenced by id only.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::{ConceptName, EntityId, Locale};

/// A free-text description of a concept.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptDescription {
    /// Description text.
    pub description: String,
    /// Locale of the description, if known.
    pub locale: Option<Locale>,
}

impl ConceptDescription {
    /// Creates a description.
    pub fn new(description: impl Into<String>, locale: Option<Locale>) -> Self {
        Self {
            description: description.into(),
            locale,
        }
    }
}

/// A membership edge making one concept a component of a set concept.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptSet {
    /// Repository identifier of the edge.
    pub id: Option<EntityId>,
    /// The owning set concept; filled in when the owner is saved.
    pub concept_set: Option<EntityId>,
    /// The member concept.
    pub concept: EntityId,
    /// Position of the member within the set.
    pub sort_weight: u32,
}

/// A coded answer attached to a question concept.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptAnswer {
    /// Repository identifier of the answer row.
    pub id: Option<EntityId>,
    /// The question concept; filled in when the question is saved.
    pub question: Option<EntityId>,
    /// The answer concept.
    pub answer_concept: EntityId,
    /// Optional drug the answer refers to.
    pub answer_drug: Option<EntityId>,
    /// Position of the answer within the question.
    pub sort_weight: u32,
}

/// A link from a concept to an external reference term.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptMap {
    /// Repository identifier of the map row.
    pub id: Option<EntityId>,
    /// The referenced [`ConceptReferenceTerm`](crate::ConceptReferenceTerm).
    pub term: EntityId,
    /// The [`ConceptMapType`](crate::ConceptMapType) qualifying the link.
    pub map_type: EntityId,
}

/// An atomic unit of clinical meaning.
///
/// # Examples
///
/// ```
/// use dictionary_types::{Concept, ConceptName, ConceptNameType, Locale};
///
/// let en = Locale::new("en", "US");
/// let mut concept = Concept::new();
/// concept.add_name(ConceptName::new("Hemoglobin", en.clone()).with_type(ConceptNameType::FullySpecified));
/// concept.add_name(ConceptName::new("Hb", en.clone()).with_type(ConceptNameType::Short));
///
/// assert!(!concept.is_saved());
/// assert_eq!(concept.fully_specified_name(&en).map(|n| n.name.as_str()), Some("Hemoglobin"));
/// assert!(concept.preferred_name(&en).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Concept {
    /// Repository identifier, `None` until the first save.
    pub id: Option<EntityId>,
    /// Stable external identifier.
    pub uuid: Uuid,
    /// All names across all locales, including voided ones.
    pub names: Vec<ConceptName>,
    /// Free-text descriptions.
    pub descriptions: Vec<ConceptDescription>,
    /// Required [`ConceptDatatype`](crate::ConceptDatatype) id.
    pub datatype: Option<EntityId>,
    /// Required [`ConceptClass`](crate::ConceptClass) id.
    pub concept_class: Option<EntityId>,
    /// Whether this concept is a set; forced on when set members exist.
    pub is_set: bool,
    /// Ordered set members.
    pub set_members: Vec<ConceptSet>,
    /// Ordered coded answers.
    pub answers: Vec<ConceptAnswer>,
    /// Reference-term mappings.
    pub mappings: Vec<ConceptMap>,
    /// Whether the concept is retired.
    pub retired: bool,
    /// Reason recorded when retiring.
    pub retire_reason: Option<String>,
}

impl Default for Concept {
    fn default() -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            names: Vec::new(),
            descriptions: Vec::new(),
            datatype: None,
            concept_class: None,
            is_set: false,
            set_members: Vec::new(),
            answers: Vec::new(),
            mappings: Vec::new(),
            retired: false,
            retire_reason: None,
        }
    }
}

impl Concept {
    /// Creates a new unsaved concept with no names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once the repository has assigned an id.
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Appends a name.
    pub fn add_name(&mut self, name: ConceptName) {
        self.names.push(name);
    }

    /// Appends a description.
    pub fn add_description(&mut self, description: ConceptDescription) {
        self.descriptions.push(description);
    }

    /// Appends a set member after the current last member.
    ///
    /// This does not touch `is_set`; saving the concept repairs the flag.
    pub fn add_set_member(&mut self, member: EntityId) {
        let sort_weight = next_sort_weight(self.set_members.iter().map(|s| s.sort_weight));
        self.set_members.push(ConceptSet {
            id: None,
            concept_set: self.id,
            concept: member,
            sort_weight,
        });
    }

    /// Appends a coded answer.
    pub fn add_answer(&mut self, answer_concept: EntityId, answer_drug: Option<EntityId>) {
        let sort_weight = next_sort_weight(self.answers.iter().map(|a| a.sort_weight));
        self.answers.push(ConceptAnswer {
            id: None,
            question: self.id,
            answer_concept,
            answer_drug,
            sort_weight,
        });
    }

    /// Appends a mapping to a reference term.
    pub fn add_mapping(&mut self, term: EntityId, map_type: EntityId) {
        self.mappings.push(ConceptMap {
            id: None,
            term,
            map_type,
        });
    }

    /// Returns true if the concept lists the given concept as an answer.
    pub fn has_answer(&self, answer_concept: EntityId) -> bool {
        self.answers.iter().any(|a| a.answer_concept == answer_concept)
    }

    /// Returns the non-voided names in exactly the given locale.
    pub fn names_in_locale<'a, 'l>(
        &'a self,
        locale: &'l Locale,
    ) -> impl Iterator<Item = &'a ConceptName> + 'l
    where
        'a: 'l,
    {
        self.names.iter().filter(move |n| n.is_active_in(locale))
    }

    /// Returns the preferred name of the given locale, if one is marked.
    pub fn preferred_name(&self, locale: &Locale) -> Option<&ConceptName> {
        self.names
            .iter()
            .find(|n| n.is_active_in(locale) && n.locale_preferred)
    }

    /// Returns the fully specified name of the given locale.
    pub fn fully_specified_name(&self, locale: &Locale) -> Option<&ConceptName> {
        self.names
            .iter()
            .find(|n| n.is_active_in(locale) && n.is_fully_specified())
    }

    /// Returns a display name without regard to locale.
    ///
    /// Picks the first preferred name, then the first fully specified name,
    /// then the first non-voided name.
    pub fn name(&self) -> Option<&ConceptName> {
        let active = || self.names.iter().filter(|n| !n.voided);
        active()
            .find(|n| n.locale_preferred)
            .or_else(|| active().find(|n| n.is_fully_specified()))
            .or_else(|| active().next())
    }

    /// Returns the distinct locales of all non-voided names.
    pub fn locales(&self) -> BTreeSet<Locale> {
        self.names
            .iter()
            .filter(|n| !n.voided)
            .map(|n| n.locale.clone())
            .collect()
    }
}

crate::retire::impl_retireable!(Concept);

fn next_sort_weight(weights: impl Iterator<Item = u32>) -> u32 {
    weights.max().map_or(1, |max| max + 1)
}
