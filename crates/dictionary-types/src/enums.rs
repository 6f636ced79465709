//! Dictionary enumeration types.
//!
//! This module provides enum representations for coded values such as the
//! semantic type of a concept name and the workflow state of a proposal.

/// Semantic type of a concept name.
///
/// A name with no explicit type is a synonym, which is why `Synonym` is the
/// default variant.
///
/// # Examples
///
/// ```
/// use dictionary_types::ConceptNameType;
///
/// assert_eq!(ConceptNameType::default(), ConceptNameType::Synonym);
/// assert!(ConceptNameType::FullySpecified.is_default_preferred_candidate());
/// assert!(!ConceptNameType::Short.is_default_preferred_candidate());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ConceptNameType {
    /// The canonical, unambiguous name for a concept in a locale.
    FullySpecified,
    /// Abbreviated form, never chosen as a default preferred name.
    Short,
    /// Search-only term, never chosen as a default preferred name.
    IndexTerm,
    /// Untyped alternative name.
    #[default]
    Synonym,
}

impl ConceptNameType {
    /// Returns true if names of this type may be picked as the default
    /// preferred name of a locale.
    pub fn is_default_preferred_candidate(self) -> bool {
        matches!(self, Self::FullySpecified | Self::Synonym)
    }
}

/// Workflow state of a concept proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ProposalState {
    /// Awaiting review.
    #[default]
    Unmapped,
    /// Mapped to an existing concept.
    Concept,
    /// Mapped to an existing concept and added to it as a synonym.
    Synonym,
    /// Rejected by a reviewer.
    Reject,
}

impl ProposalState {
    /// Returns true once a reviewer has acted on the proposal.
    pub fn is_completed(self) -> bool {
        !matches!(self, Self::Unmapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preferred_candidates() {
        assert!(ConceptNameType::FullySpecified.is_default_preferred_candidate());
        assert!(ConceptNameType::Synonym.is_default_preferred_candidate());
        assert!(!ConceptNameType::Short.is_default_preferred_candidate());
        assert!(!ConceptNameType::IndexTerm.is_default_preferred_candidate());
    }

    #[test]
    fn test_proposal_state_completion() {
        assert!(!ProposalState::Unmapped.is_completed());
        assert!(ProposalState::Concept.is_completed());
        assert!(ProposalState::Synonym.is_completed());
        assert!(ProposalState::Reject.is_completed());
    }
}
