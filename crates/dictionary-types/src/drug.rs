//! Drug type.

use uuid::Uuid;

use crate::EntityId;

/// A prescribable drug formulation of a generic concept.
///
/// # Examples
///
/// ```
/// use dictionary_types::{Drug, Retireable};
///
/// let mut drug = Drug::new("Triomune-30", 792);
/// drug.ingredients.extend([88, 89, 90]);
///
/// assert!(drug.has_ingredient(89));
/// assert!(!drug.is_retired());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Drug {
    /// Repository identifier, `None` until the first save.
    pub id: Option<EntityId>,
    /// Stable external identifier.
    pub uuid: Uuid,
    /// Formulary name of the drug.
    pub name: String,
    /// The generic concept this drug is a formulation of.
    pub concept: EntityId,
    /// Ingredient concepts.
    pub ingredients: Vec<EntityId>,
    /// Dosage form concept (tablet, syrup, ...).
    pub dosage_form: Option<EntityId>,
    /// Free-text strength, such as "30mg".
    pub strength: Option<String>,
    /// Whether the drug combines several active ingredients.
    pub combination: bool,
    /// Whether the drug is retired.
    pub retired: bool,
    /// Reason recorded when retiring.
    pub retire_reason: Option<String>,
}

impl Drug {
    /// Creates an unsaved drug for the given concept.
    pub fn new(name: impl Into<String>, concept: EntityId) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            name: name.into(),
            concept,
            ingredients: Vec::new(),
            dosage_form: None,
            strength: None,
            combination: false,
            retired: false,
            retire_reason: None,
        }
    }

    /// Returns true if the drug lists the given ingredient concept.
    pub fn has_ingredient(&self, concept: EntityId) -> bool {
        self.ingredients.contains(&concept)
    }
}

crate::retire::impl_retireable!(Drug);
