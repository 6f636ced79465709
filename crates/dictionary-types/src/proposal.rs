//! Concept proposal type.

use uuid::Uuid;

use crate::{EntityId, ProposalState};

/// A user-submitted request to add a term to the dictionary.
///
/// Reviewers either map it to an existing concept (optionally adding the
/// proposed text as a synonym) or reject it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptProposal {
    /// Repository identifier.
    pub id: Option<EntityId>,
    /// Stable external identifier.
    pub uuid: Uuid,
    /// Text as entered by the proposer.
    pub original_text: String,
    /// Text as corrected by the reviewer.
    pub final_text: Option<String>,
    /// Question concept the proposal was entered against.
    pub obs_concept: Option<EntityId>,
    /// Concept the proposal was mapped to.
    pub mapped_concept: Option<EntityId>,
    /// Workflow state.
    pub state: ProposalState,
    /// Reviewer comments.
    pub comments: Option<String>,
}

impl ConceptProposal {
    /// Creates an unsaved, unmapped proposal.
    pub fn new(original_text: impl Into<String>) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            original_text: original_text.into(),
            final_text: None,
            obs_concept: None,
            mapped_concept: None,
            state: ProposalState::Unmapped,
            comments: None,
        }
    }

    /// Returns the reviewer's text when present and non-blank, otherwise the
    /// original text, trimmed.
    pub fn effective_text(&self) -> &str {
        self.final_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| self.original_text.trim())
    }

    /// Returns true once the proposal has been mapped or rejected.
    pub fn is_completed(&self) -> bool {
        self.state.is_completed()
    }
}
