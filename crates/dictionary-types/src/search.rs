//! Search result types.

use crate::{Concept, ConceptName};

/// How a concept name matched a search phrase.
///
/// Variants are ordered from strongest to weakest match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchKind {
    /// The name equals the phrase, ignoring case.
    Exact,
    /// The name starts with the phrase.
    Prefix,
    /// The name contains the phrase elsewhere.
    Contains,
}

impl MatchKind {
    /// Classifies how `name` matches `phrase`, ignoring case.
    ///
    /// Returns `None` when the phrase does not occur in the name. An empty
    /// phrase matches every name as a prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use dictionary_types::MatchKind;
    ///
    /// assert_eq!(MatchKind::classify("CD4 COUNT", "cd4 count"), Some(MatchKind::Exact));
    /// assert_eq!(MatchKind::classify("CD4 COUNT", "cd4"), Some(MatchKind::Prefix));
    /// assert_eq!(MatchKind::classify("CD4 COUNT", "count"), Some(MatchKind::Contains));
    /// assert_eq!(MatchKind::classify("CD4 COUNT", "viral"), None);
    /// ```
    pub fn classify(name: &str, phrase: &str) -> Option<Self> {
        let name = name.to_lowercase();
        let phrase = phrase.trim().to_lowercase();
        if name == phrase {
            Some(Self::Exact)
        } else if name.starts_with(&phrase) {
            Some(Self::Prefix)
        } else if name.contains(&phrase) {
            Some(Self::Contains)
        } else {
            None
        }
    }
}

/// One concept found by a phrase search.
///
/// `concept_name` is the name that matched, which is not necessarily the
/// preferred name of the concept.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptSearchResult {
    /// The phrase that was searched for.
    pub word: String,
    /// The matching concept.
    pub concept: Concept,
    /// The name of the concept that matched the phrase.
    pub concept_name: ConceptName,
    /// Strength of the match.
    pub match_kind: MatchKind,
}
