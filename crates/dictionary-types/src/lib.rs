//! # dictionary-types
//!
//! Type definitions for a controlled clinical concept dictionary.
//!
//! This crate provides Rust type definitions for concepts, their
//! locale-specific names, set membership, drugs, external reference terms
//! and the lookup entities that qualify them.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!
//! ## Usage
//!
//! ```rust
//! use dictionary_types::{Concept, ConceptDescription, ConceptName, ConceptNameType, Locale};
//!
//! let locale = Locale::new("fr", "CA");
//! let mut concept = Concept::new();
//! concept.add_name(ConceptName::new("fully specified", locale.clone()).with_type(ConceptNameType::FullySpecified));
//! concept.add_description(ConceptDescription::new("some description", None));
//! concept.datatype = Some(1);
//! concept.concept_class = Some(1);
//!
//! assert!(!concept.is_saved());
//! assert_eq!(concept.locales().len(), 1);
//! ```

#![warn(missing_docs)]

mod concept;
mod drug;
mod enums;
mod id;
mod locale;
mod lookup;
mod name;
mod proposal;
mod retire;
mod search;
pub mod well_known;

// Re-export all public types at crate root
pub use concept::{Concept, ConceptAnswer, ConceptDescription, ConceptMap, ConceptSet};
pub use drug::Drug;
pub use enums::{ConceptNameType, ProposalState};
pub use id::EntityId;
pub use locale::Locale;
pub use lookup::{
    ConceptClass, ConceptDatatype, ConceptMapType, ConceptReferenceTerm, ConceptSource,
};
pub use name::{ConceptName, ConceptNameTag};
pub use proposal::ConceptProposal;
pub use retire::Retireable;
pub use search::{ConceptSearchResult, MatchKind};
