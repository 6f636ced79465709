//! # dictionary-core
//!
//! Consistency, name-resolution and query engine for a clinical concept
//! dictionary.
//!
//! The engine keeps the dictionary valid whenever a concept is created,
//! updated, retired or purged:
//!
//! - [`resolver`]: default locale-preferred names
//! - [`normalize`]: name trimming and set flag repair
//! - [`validator`]: structural rules, reported as one aggregate error
//! - [`lifecycle`]: save, retire, unretire and purge orchestration
//! - [`query`]: filtered and paginated read-only lookups
//!
//! Storage sits behind the [`Repository`] trait. [`InMemoryRepository`] is a
//! complete implementation for tests and embedders.
//!
//! ## Usage
//!
//! ```rust
//! use dictionary_core::{ConceptDictionary, DictionaryConfig, InMemoryRepository};
//! use dictionary_types::{Concept, ConceptClass, ConceptDatatype, ConceptName, ConceptNameType, Locale};
//!
//! let mut dictionary = ConceptDictionary::new(InMemoryRepository::new(), DictionaryConfig::default());
//!
//! let mut class = ConceptClass::new("Test");
//! let mut datatype = ConceptDatatype::new("Numeric", "NM");
//! dictionary.lifecycle().save_concept_class(&mut class).unwrap();
//! dictionary.lifecycle().save_concept_datatype(&mut datatype).unwrap();
//!
//! let en_gb = Locale::new("en", "GB");
//! let mut concept = Concept::new();
//! concept.add_name(ConceptName::new("CD4 COUNT", en_gb.clone()).with_type(ConceptNameType::FullySpecified));
//! concept.concept_class = class.id;
//! concept.datatype = datatype.id;
//! dictionary.lifecycle().save_concept(&mut concept).unwrap();
//!
//! let results = dictionary.query().get_concepts("cd4", &en_gb, false).unwrap();
//! assert_eq!(results[0].concept_name.name, "CD4 COUNT");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod normalize;
pub mod query;
pub mod repository;
pub mod resolver;
pub mod validator;

pub use config::{ConfigError, DictionaryConfig, PurgePolicy};
pub use error::{
    DictionaryError, DictionaryResult, RepositoryError, RepositoryResult, ValidationErrors,
    Violation,
};
pub use lifecycle::ConceptLifecycleService;
pub use logging::{init_logging, LoggingError};
pub use query::{ConceptQueryService, DrugSearchFlags};
pub use repository::{Entity, EntityKind, InMemoryRepository, Page, Repository};
pub use resolver::{resolve_preferred_names, PreferredNames};
pub use validator::{ConceptValidator, ValidationResult};

/// A repository paired with the configuration its services run under.
#[derive(Debug)]
pub struct ConceptDictionary<R: Repository> {
    repository: R,
    config: DictionaryConfig,
}

impl<R: Repository> ConceptDictionary<R> {
    /// Creates a dictionary over `repository`.
    pub fn new(repository: R, config: DictionaryConfig) -> Self {
        Self { repository, config }
    }

    /// Returns the mutating service.
    pub fn lifecycle(&mut self) -> ConceptLifecycleService<'_, R> {
        ConceptLifecycleService::new(&mut self.repository, &self.config)
    }

    /// Returns the read-only service.
    pub fn query(&self) -> ConceptQueryService<'_, R> {
        ConceptQueryService::new(&self.repository, &self.config)
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DictionaryConfig {
        &self.config
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns the underlying repository mutably.
    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    /// Consumes the dictionary, returning the repository.
    pub fn into_repository(self) -> R {
        self.repository
    }
}

impl Default for ConceptDictionary<InMemoryRepository> {
    fn default() -> Self {
        Self::new(InMemoryRepository::new(), DictionaryConfig::default())
    }
}
