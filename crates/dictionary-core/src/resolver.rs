//! Locale-preferred name resolution.
//!
//! Every locale that has names should have one preferred name. Callers may
//! mark one explicitly; when none is marked, a default is chosen:
//!
//! 1. an explicitly preferred name is always kept, whatever its type
//! 2. otherwise the fully specified name
//! 3. otherwise the first synonym
//! 4. otherwise nothing (short names and index terms are never picked)
//!
//! Resolution never adds or removes names and is idempotent.

use std::collections::BTreeSet;

use dictionary_types::{Concept, ConceptName, Locale};

/// Returns a copy of `names` with a default preferred name marked in each
/// locale that lacks one.
///
/// Voided names are carried through unchanged and never chosen.
///
/// # Example
///
/// ```
/// use dictionary_core::resolve_preferred_names;
/// use dictionary_types::{ConceptName, ConceptNameType, Locale};
///
/// let en = Locale::from_language("en");
/// let names = vec![
///     ConceptName::new("Hb", en.clone()).with_type(ConceptNameType::Short),
///     ConceptName::new("Haemoglobin", en.clone()).with_type(ConceptNameType::FullySpecified),
/// ];
///
/// let resolved = resolve_preferred_names(&names);
/// assert!(!resolved[0].locale_preferred);
/// assert!(resolved[1].locale_preferred);
/// ```
pub fn resolve_preferred_names(names: &[ConceptName]) -> Vec<ConceptName> {
    let mut resolved = names.to_vec();

    let locales: BTreeSet<Locale> = resolved
        .iter()
        .filter(|n| !n.voided)
        .map(|n| n.locale.clone())
        .collect();

    for locale in &locales {
        let in_locale: Vec<usize> = resolved
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_active_in(locale))
            .map(|(i, _)| i)
            .collect();

        if in_locale.iter().any(|&i| resolved[i].locale_preferred) {
            continue;
        }

        let candidates: Vec<usize> = in_locale
            .into_iter()
            .filter(|&i| resolved[i].name_type.is_default_preferred_candidate())
            .collect();
        let pick = candidates
            .iter()
            .copied()
            .find(|&i| resolved[i].is_fully_specified())
            .or_else(|| candidates.iter().copied().find(|&i| resolved[i].is_synonym()));

        if let Some(i) = pick {
            tracing::trace!(locale = %locale, name = %resolved[i].name, "defaulted preferred name");
            resolved[i].locale_preferred = true;
        }
    }

    resolved
}

/// In-place preferred name resolution for a concept.
pub trait PreferredNames {
    /// Replaces the name collection with its resolved form.
    fn resolve_preferred_names(&mut self);
}

impl PreferredNames for Concept {
    fn resolve_preferred_names(&mut self) {
        self.names = resolve_preferred_names(&self.names);
    }
}
