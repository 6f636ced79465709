//! Normalization applied to a concept before it is validated.
//!
//! These steps mutate the caller's concept and their effects stay in place
//! even when validation later fails.

use dictionary_types::Concept;

/// Trims surrounding whitespace from every name.
pub fn trim_names(concept: &mut Concept) {
    for name in &mut concept.names {
        let trimmed = name.name.trim();
        if trimmed.len() != name.name.len() {
            name.name = trimmed.to_string();
        }
    }
}

/// Forces `is_set` on when the concept has set members.
///
/// Returns true if the flag was changed.
pub fn repair_set_flag(concept: &mut Concept) -> bool {
    if !concept.set_members.is_empty() && !concept.is_set {
        concept.is_set = true;
        return true;
    }
    false
}

/// Runs every normalization step.
pub fn normalize_concept(concept: &mut Concept) {
    trim_names(concept);
    if repair_set_flag(concept) {
        tracing::debug!(concept = ?concept.id, "forced set flag on concept with members");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dictionary_types::{ConceptName, Locale};

    #[test]
    fn test_trim_names() {
        let mut concept = Concept::new();
        concept.add_name(ConceptName::new("  jwm  ", Locale::new("en", "US")));
        concept.add_name(ConceptName::new("ok", Locale::new("en", "US")));

        trim_names(&mut concept);

        assert_eq!(concept.names[0].name, "jwm");
        assert_eq!(concept.names[1].name, "ok");
    }

    #[test]
    fn test_repair_set_flag() {
        let mut concept = Concept::new();
        assert!(!repair_set_flag(&mut concept));
        assert!(!concept.is_set);

        concept.add_set_member(12);
        assert!(repair_set_flag(&mut concept));
        assert!(concept.is_set);
        assert!(!repair_set_flag(&mut concept));
    }

    #[test]
    fn test_empty_set_keeps_explicit_flag() {
        let mut concept = Concept::new();
        concept.is_set = true;
        normalize_concept(&mut concept);
        assert!(concept.is_set);
    }
}
