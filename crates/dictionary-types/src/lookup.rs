//! Reference and lookup entities.
//!
//! These entities carry no resolution logic of their own. They share the
//! retire lifecycle and are filtered by their retired flag in listings.

use uuid::Uuid;

use crate::EntityId;

/// Broad category of a concept (Test, Diagnosis, Drug, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptClass {
    /// Repository identifier.
    pub id: Option<EntityId>,
    /// Stable external identifier.
    pub uuid: Uuid,
    /// Class name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the class is retired.
    pub retired: bool,
    /// Reason recorded when retiring.
    pub retire_reason: Option<String>,
}

impl ConceptClass {
    /// Creates an unsaved class.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            name: name.into(),
            description: None,
            retired: false,
            retire_reason: None,
        }
    }
}

/// Value type of a concept (Numeric, Coded, Text, N/A, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptDatatype {
    /// Repository identifier.
    pub id: Option<EntityId>,
    /// Stable external identifier.
    pub uuid: Uuid,
    /// Datatype name.
    pub name: String,
    /// HL7 v2 abbreviation, see [`well_known`](crate::well_known).
    pub hl7_abbreviation: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the datatype is retired.
    pub retired: bool,
    /// Reason recorded when retiring.
    pub retire_reason: Option<String>,
}

impl ConceptDatatype {
    /// Creates an unsaved datatype.
    pub fn new(name: impl Into<String>, hl7_abbreviation: impl Into<String>) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            name: name.into(),
            hl7_abbreviation: hl7_abbreviation.into(),
            description: None,
            retired: false,
            retire_reason: None,
        }
    }
}

/// An external coding system (SNOMED CT, ICD-10, LOINC, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptSource {
    /// Repository identifier.
    pub id: Option<EntityId>,
    /// Stable external identifier.
    pub uuid: Uuid,
    /// Source name.
    pub name: String,
    /// HL7 coding system code.
    pub hl7_code: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the source is retired.
    pub retired: bool,
    /// Reason recorded when retiring.
    pub retire_reason: Option<String>,
}

impl ConceptSource {
    /// Creates an unsaved source.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            name: name.into(),
            hl7_code: None,
            description: None,
            retired: false,
            retire_reason: None,
        }
    }
}

/// Qualifier of a concept-to-term mapping (SAME-AS, NARROWER-THAN, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptMapType {
    /// Repository identifier.
    pub id: Option<EntityId>,
    /// Stable external identifier.
    pub uuid: Uuid,
    /// Map type name.
    pub name: String,
    /// Hidden map types are excluded from user-facing pickers.
    pub is_hidden: bool,
    /// Whether the map type is retired.
    pub retired: bool,
    /// Reason recorded when retiring.
    pub retire_reason: Option<String>,
}

impl ConceptMapType {
    /// Creates an unsaved, visible map type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            name: name.into(),
            is_hidden: false,
            retired: false,
            retire_reason: None,
        }
    }
}

/// A code in an external coding system.
///
/// # Examples
///
/// ```
/// use dictionary_types::ConceptReferenceTerm;
///
/// let term = ConceptReferenceTerm::new("24656-8", 4).with_name("CD4 count");
/// assert_eq!(term.code, "24656-8");
/// assert_eq!(term.source, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptReferenceTerm {
    /// Repository identifier.
    pub id: Option<EntityId>,
    /// Stable external identifier.
    pub uuid: Uuid,
    /// Code within the source.
    pub code: String,
    /// Optional human readable name.
    pub name: Option<String>,
    /// Owning [`ConceptSource`] id.
    pub source: EntityId,
    /// Whether the term is retired.
    pub retired: bool,
    /// Reason recorded when retiring.
    pub retire_reason: Option<String>,
}

impl ConceptReferenceTerm {
    /// Creates an unsaved term in the given source.
    pub fn new(code: impl Into<String>, source: EntityId) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            code: code.into(),
            name: None,
            source,
            retired: false,
            retire_reason: None,
        }
    }

    /// Returns this term with the given name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

crate::retire::impl_retireable!(
    ConceptClass,
    ConceptDatatype,
    ConceptSource,
    ConceptMapType,
    ConceptReferenceTerm,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Retireable;

    #[test]
    fn test_lookup_constructors_start_active() {
        assert!(!ConceptClass::new("Test").is_retired());
        assert!(!ConceptDatatype::new("Numeric", "NM").is_retired());
        assert!(!ConceptSource::new("LOINC").is_retired());
        assert!(!ConceptMapType::new("SAME-AS").is_retired());
        assert!(!ConceptReferenceTerm::new("A01", 1).is_retired());
    }

    #[test]
    fn test_retire_lookup() {
        let mut source = ConceptSource::new("Local");
        source.mark_retired("merged");
        assert!(source.is_retired());
        assert_eq!(source.retire_reason(), Some("merged"));
    }

    #[test]
    fn test_reference_term_name() {
        let term = ConceptReferenceTerm::new("B20", 2);
        assert_eq!(term.name, None);
        assert_eq!(term.with_name("HIV disease").name.as_deref(), Some("HIV disease"));
    }
}
