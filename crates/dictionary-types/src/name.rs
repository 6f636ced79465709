//! Concept name and name tag types.

use uuid::Uuid;

use crate::{ConceptNameType, EntityId, Locale};

/// One textual rendering of a concept in one locale.
///
/// # Examples
///
/// ```
/// use dictionary_types::{ConceptName, ConceptNameType, Locale};
///
/// let name = ConceptName::new("CD4 COUNT", Locale::new("en", "GB"))
///     .with_type(ConceptNameType::FullySpecified);
///
/// assert!(name.is_fully_specified());
/// assert!(!name.is_preferred());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptName {
    /// Repository identifier, `None` until the owning concept is saved.
    pub id: Option<EntityId>,
    /// Stable external identifier.
    pub uuid: Uuid,
    /// The name text.
    pub name: String,
    /// Locale this name belongs to.
    pub locale: Locale,
    /// Semantic type of the name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name_type: ConceptNameType,
    /// Whether this is the preferred name of its locale.
    pub locale_preferred: bool,
    /// Identifiers of attached [`ConceptNameTag`]s.
    pub tags: Vec<EntityId>,
    /// Voided names are kept for history but ignored by resolution and search.
    pub voided: bool,
}

impl ConceptName {
    /// Creates an unsaved synonym in the given locale.
    pub fn new(name: impl Into<String>, locale: Locale) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            name: name.into(),
            locale,
            name_type: ConceptNameType::Synonym,
            locale_preferred: false,
            tags: Vec::new(),
            voided: false,
        }
    }

    /// Returns this name with the given type.
    pub fn with_type(mut self, name_type: ConceptNameType) -> Self {
        self.name_type = name_type;
        self
    }

    /// Returns this name with the preferred flag set.
    pub fn preferred(mut self) -> Self {
        self.locale_preferred = true;
        self
    }

    /// Returns true if this name is the preferred name of its locale.
    pub fn is_preferred(&self) -> bool {
        self.locale_preferred
    }

    /// Returns true if this is a fully specified name.
    pub fn is_fully_specified(&self) -> bool {
        self.name_type == ConceptNameType::FullySpecified
    }

    /// Returns true if this is a synonym.
    pub fn is_synonym(&self) -> bool {
        self.name_type == ConceptNameType::Synonym
    }

    /// Returns true if the name is not voided and belongs to exactly `locale`.
    pub fn is_active_in(&self, locale: &Locale) -> bool {
        !self.voided && &self.locale == locale
    }

    /// Returns true if the name has a tag with the given id.
    pub fn has_tag(&self, tag_id: EntityId) -> bool {
        self.tags.contains(&tag_id)
    }
}

/// A label attached to concept names, such as "preferred_en".
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptNameTag {
    /// Repository identifier.
    pub id: Option<EntityId>,
    /// Stable external identifier.
    pub uuid: Uuid,
    /// Tag text, unique across the dictionary.
    pub tag: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Whether the tag is retired.
    pub retired: bool,
    /// Reason recorded when retiring.
    pub retire_reason: Option<String>,
}

impl ConceptNameTag {
    /// Creates an unsaved tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            tag: tag.into(),
            description: None,
            retired: false,
            retire_reason: None,
        }
    }
}

crate::retire::impl_retireable!(ConceptNameTag);
