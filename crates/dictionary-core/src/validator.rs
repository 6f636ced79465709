//! Structural validation of dictionary entities.
//!
//! Validators collect every broken rule instead of stopping at the first one,
//! so callers can report all problems at once.

use std::collections::BTreeMap;

use dictionary_types::{Concept, ConceptReferenceTerm, Drug, Locale, Retireable};

use crate::error::{ValidationErrors, Violation};
use crate::repository::EntityKind;

/// The outcome of validating one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    violations: Vec<Violation>,
}

impl ValidationResult {
    /// Creates an empty (valid) result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no rule was violated.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns the violations in check order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Records a violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Converts the result into an error carrying every violation.
    pub fn into_result(self, kind: EntityKind) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                kind,
                violations: self.violations,
            })
        }
    }
}

/// Checks the structural rules of concepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConceptValidator;

impl ConceptValidator {
    /// Validates a concept.
    ///
    /// Normalization and preferred name resolution are expected to have run
    /// already; this only reports.
    ///
    /// # Example
    ///
    /// ```
    /// use dictionary_core::{ConceptValidator, Violation};
    /// use dictionary_types::Concept;
    ///
    /// let result = ConceptValidator.validate(&Concept::new());
    /// assert!(!result.is_valid());
    /// assert!(result.violations().contains(&Violation::MissingName));
    /// assert!(result.violations().contains(&Violation::MissingDatatype));
    /// ```
    pub fn validate(&self, concept: &Concept) -> ValidationResult {
        let mut result = ValidationResult::new();
        let active: Vec<_> = concept.names.iter().filter(|n| !n.voided).collect();

        if active.is_empty() {
            result.push(Violation::MissingName);
        }
        for name in &active {
            if name.name.trim().is_empty() {
                result.push(Violation::BlankName {
                    locale: name.locale.clone(),
                });
            }
        }

        if concept.datatype.is_none() {
            result.push(Violation::MissingDatatype);
        }
        if concept.concept_class.is_none() {
            result.push(Violation::MissingClass);
        }

        // (fully specified, preferred) counts per locale
        let mut per_locale: BTreeMap<&Locale, (usize, usize)> = BTreeMap::new();
        for name in &active {
            let counts = per_locale.entry(&name.locale).or_default();
            if name.is_fully_specified() {
                counts.0 += 1;
            }
            if name.is_preferred() {
                counts.1 += 1;
            }
        }
        for (locale, (fully_specified, preferred)) in per_locale {
            if fully_specified > 1 {
                result.push(Violation::DuplicateFullySpecifiedName {
                    locale: locale.clone(),
                });
            }
            if preferred > 1 {
                result.push(Violation::DuplicatePreferredName {
                    locale: locale.clone(),
                });
            }
        }

        check_retirement(concept, EntityKind::Concept, &mut result);

        if let Some(id) = concept.id {
            if concept.set_members.iter().any(|s| s.concept == id) {
                result.push(Violation::SetContainsItself { concept: id });
            }
        }

        result
    }
}

/// Validates a drug.
pub fn validate_drug(drug: &Drug) -> ValidationResult {
    let mut result = ValidationResult::new();
    if drug.name.trim().is_empty() {
        result.push(Violation::BlankDrugName);
    }
    check_retirement(drug, EntityKind::Drug, &mut result);
    result
}

/// Validates a reference term.
pub fn validate_reference_term(term: &ConceptReferenceTerm) -> ValidationResult {
    let mut result = ValidationResult::new();
    if term.code.trim().is_empty() {
        result.push(Violation::BlankTermCode);
    }
    check_retirement(term, EntityKind::ConceptReferenceTerm, &mut result);
    result
}

/// Validates the retirement fields of any retireable entity.
pub fn validate_retirement<T: Retireable>(entity: &T, kind: EntityKind) -> ValidationResult {
    let mut result = ValidationResult::new();
    check_retirement(entity, kind, &mut result);
    result
}

fn check_retirement<T: Retireable>(entity: &T, kind: EntityKind, result: &mut ValidationResult) {
    let has_reason = entity
        .retire_reason()
        .is_some_and(|reason| !reason.trim().is_empty());
    if entity.is_retired() && !has_reason {
        result.push(Violation::MissingRetireReason { kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dictionary_types::{ConceptName, ConceptNameType};

    fn valid_concept() -> Concept {
        let mut concept = Concept::new();
        concept.add_name(
            ConceptName::new("CD4 COUNT", Locale::new("en", "GB"))
                .with_type(ConceptNameType::FullySpecified)
                .preferred(),
        );
        concept.datatype = Some(1);
        concept.concept_class = Some(1);
        concept
    }

    #[test]
    fn test_valid_concept() {
        assert!(ConceptValidator.validate(&valid_concept()).is_valid());
    }

    #[test]
    fn test_reports_every_violation() {
        let concept = Concept::new();
        let result = ConceptValidator.validate(&concept);
        assert_eq!(
            result.violations(),
            &[
                Violation::MissingName,
                Violation::MissingDatatype,
                Violation::MissingClass
            ]
        );

        let err = result.into_result(EntityKind::Concept).unwrap_err();
        assert_eq!(err.violations.len(), 3);
    }

    #[test]
    fn test_blank_name() {
        let mut concept = valid_concept();
        concept.add_name(ConceptName::new("   ", Locale::from_language("fr")));

        let result = ConceptValidator.validate(&concept);
        assert_eq!(
            result.violations(),
            &[Violation::BlankName {
                locale: Locale::from_language("fr")
            }]
        );
    }

    #[test]
    fn test_voided_names_do_not_count() {
        let mut concept = valid_concept();
        concept.names[0].voided = true;

        let result = ConceptValidator.validate(&concept);
        assert_eq!(result.violations(), &[Violation::MissingName]);
    }

    #[test]
    fn test_duplicates_within_a_locale() {
        let mut concept = valid_concept();
        concept.add_name(
            ConceptName::new("CD4", Locale::new("en", "GB"))
                .with_type(ConceptNameType::FullySpecified)
                .preferred(),
        );
        // Same types in a different locale are fine.
        concept.add_name(
            ConceptName::new("CD4", Locale::new("en", "US"))
                .with_type(ConceptNameType::FullySpecified)
                .preferred(),
        );

        let result = ConceptValidator.validate(&concept);
        assert_eq!(
            result.violations(),
            &[
                Violation::DuplicateFullySpecifiedName {
                    locale: Locale::new("en", "GB")
                },
                Violation::DuplicatePreferredName {
                    locale: Locale::new("en", "GB")
                },
            ]
        );
    }

    #[test]
    fn test_retired_without_reason() {
        let mut concept = valid_concept();
        concept.retired = true;
        concept.retire_reason = Some(" ".to_string());

        let result = ConceptValidator.validate(&concept);
        assert_eq!(
            result.violations(),
            &[Violation::MissingRetireReason {
                kind: EntityKind::Concept
            }]
        );
    }

    #[test]
    fn test_set_cannot_contain_itself() {
        let mut concept = valid_concept();
        concept.id = Some(9);
        concept.add_set_member(9);
        concept.is_set = true;

        let result = ConceptValidator.validate(&concept);
        assert_eq!(
            result.violations(),
            &[Violation::SetContainsItself { concept: 9 }]
        );
    }

    #[test]
    fn test_validate_drug_and_term() {
        assert_eq!(
            validate_drug(&Drug::new(" ", 1)).violations(),
            &[Violation::BlankDrugName]
        );
        assert!(validate_drug(&Drug::new("Triomune-30", 792)).is_valid());

        assert_eq!(
            validate_reference_term(&ConceptReferenceTerm::new("", 1)).violations(),
            &[Violation::BlankTermCode]
        );
    }

    #[test]
    fn test_validate_retirement() {
        let mut class = dictionary_types::ConceptClass::new("Misc");
        class.retired = true;
        assert!(!validate_retirement(&class, EntityKind::ConceptClass).is_valid());
        class.retire_reason = Some("unused".to_string());
        assert!(validate_retirement(&class, EntityKind::ConceptClass).is_valid());
    }
}
