//! Save, retire, unretire and purge orchestration.
//!
//! Saving a concept runs these steps in order:
//!
//! 1. normalization (name trimming, set flag repair)
//! 2. preferred name resolution
//! 3. structural validation plus reference checks against the repository
//! 4. the repository write
//!
//! Steps 1 and 2 mutate the caller's concept, so their effects remain visible
//! even when step 3 rejects the concept.

use dictionary_types::{
    Concept, ConceptClass, ConceptDatatype, ConceptMapType, ConceptName, ConceptNameTag,
    ConceptProposal, ConceptReferenceTerm, ConceptSource, Drug, EntityId, Locale, ProposalState,
    Retireable,
};

use crate::config::{DictionaryConfig, PurgePolicy};
use crate::error::{DictionaryError, DictionaryResult, Violation};
use crate::normalize::normalize_concept;
use crate::repository::{Entity, EntityKind, Page, Repository};
use crate::resolver::PreferredNames;
use crate::validator::{
    validate_drug, validate_reference_term, validate_retirement, ConceptValidator,
    ValidationResult,
};

/// Mutating operations on the dictionary.
///
/// The service borrows the repository mutably for its lifetime, so one
/// operation's intermediate state is never visible to another caller of the
/// same repository.
///
/// # Example
///
/// ```
/// use dictionary_core::{ConceptLifecycleService, DictionaryConfig, InMemoryRepository, Repository};
/// use dictionary_types::{Concept, ConceptClass, ConceptDatatype, ConceptName, Locale};
///
/// let mut repo = InMemoryRepository::new();
/// let class = repo.upsert(ConceptClass::new("Misc")).unwrap();
/// let datatype = repo.upsert(ConceptDatatype::new("Text", "ST")).unwrap();
/// let config = DictionaryConfig::default();
/// let mut service = ConceptLifecycleService::new(&mut repo, &config);
///
/// let mut concept = Concept::new();
/// concept.add_name(ConceptName::new("  jwm  ", Locale::new("en", "US")));
/// concept.concept_class = class.id;
/// concept.datatype = datatype.id;
///
/// let saved = service.save_concept(&mut concept).unwrap();
/// assert!(saved.id.is_some());
/// assert_eq!(saved.names[0].name, "jwm");
/// assert!(saved.names[0].locale_preferred);
/// ```
pub struct ConceptLifecycleService<'a, R: Repository> {
    repo: &'a mut R,
    config: &'a DictionaryConfig,
}

impl<'a, R: Repository> ConceptLifecycleService<'a, R> {
    /// Creates a service over the given repository.
    pub fn new(repo: &'a mut R, config: &'a DictionaryConfig) -> Self {
        Self { repo, config }
    }

    // =========================================================================
    // Concepts
    // =========================================================================

    /// Normalizes, resolves, validates and stores a concept.
    ///
    /// New concepts receive an id; saved concepts keep theirs. On success the
    /// caller's concept is replaced by the stored copy.
    pub fn save_concept(&mut self, concept: &mut Concept) -> DictionaryResult<Concept> {
        normalize_concept(concept);
        concept.resolve_preferred_names();

        let mut result = ConceptValidator.validate(concept);
        self.check_concept_references(concept, &mut result)?;
        if let Err(errors) = result.into_result(EntityKind::Concept) {
            tracing::debug!(concept_id = ?concept.id, %errors, "concept rejected");
            return Err(errors.into());
        }

        let saved = self.repo.upsert(concept.clone())?;
        tracing::debug!(
            concept_id = ?saved.id,
            name = saved.name().map(|n| n.name.as_str()),
            names = saved.names.len(),
            "saved concept"
        );
        *concept = saved.clone();
        Ok(saved)
    }

    /// Retires a stored concept with a non-blank reason and saves it.
    ///
    /// The reason is stored as given.
    pub fn retire_concept(
        &mut self,
        concept: &mut Concept,
        reason: Option<&str>,
    ) -> DictionaryResult<Concept> {
        let reason = require_reason(reason)?;
        self.require_stored(&*concept)?;
        concept.mark_retired(reason);
        let saved = self.save_concept(concept)?;
        tracing::info!(concept_id = ?saved.id, reason, "retired concept");
        Ok(saved)
    }

    /// Clears the retired state of a stored concept and saves it.
    pub fn unretire_concept(&mut self, concept: &mut Concept) -> DictionaryResult<Concept> {
        self.require_stored(&*concept)?;
        concept.mark_unretired();
        let saved = self.save_concept(concept)?;
        tracing::info!(concept_id = ?saved.id, "unretired concept");
        Ok(saved)
    }

    /// Deletes a concept that nothing references.
    ///
    /// Fails with a conflict when observations, other concepts, drugs or
    /// proposals still point at it.
    pub fn purge_concept(&mut self, concept: &Concept) -> DictionaryResult<()> {
        self.require_stored(concept)?;
        if self.repo.is_referenced(concept)? {
            tracing::warn!(concept_id = ?concept.id, "purge blocked, concept is referenced");
            return Err(DictionaryError::Conflict("Concept is in use".to_string()));
        }
        self.delete(concept)
    }

    fn check_concept_references(
        &self,
        concept: &Concept,
        result: &mut ValidationResult,
    ) -> DictionaryResult<()> {
        if let Some(id) = concept.datatype {
            self.check_exists::<ConceptDatatype>(id, result)?;
        }
        if let Some(id) = concept.concept_class {
            self.check_exists::<ConceptClass>(id, result)?;
        }
        for member in &concept.set_members {
            // Self membership is reported by the validator.
            if Some(member.concept) != concept.id {
                self.check_exists::<Concept>(member.concept, result)?;
            }
        }
        for answer in &concept.answers {
            if Some(answer.answer_concept) != concept.id {
                self.check_exists::<Concept>(answer.answer_concept, result)?;
            }
            if let Some(drug) = answer.answer_drug {
                self.check_exists::<Drug>(drug, result)?;
            }
        }
        for mapping in &concept.mappings {
            self.check_exists::<ConceptReferenceTerm>(mapping.term, result)?;
            self.check_exists::<ConceptMapType>(mapping.map_type, result)?;
        }
        Ok(())
    }

    // =========================================================================
    // Drugs
    // =========================================================================

    /// Validates and stores a drug.
    ///
    /// The drug's concept, ingredients and dosage form must already exist.
    pub fn save_drug(&mut self, drug: &mut Drug) -> DictionaryResult<Drug> {
        let mut result = validate_drug(drug);
        self.check_exists::<Concept>(drug.concept, &mut result)?;
        for &ingredient in &drug.ingredients {
            self.check_exists::<Concept>(ingredient, &mut result)?;
        }
        if let Some(form) = drug.dosage_form {
            self.check_exists::<Concept>(form, &mut result)?;
        }
        result.into_result(EntityKind::Drug)?;

        let saved = self.repo.upsert(drug.clone())?;
        tracing::debug!(drug_id = ?saved.id, name = %saved.name, "saved drug");
        *drug = saved.clone();
        Ok(saved)
    }

    /// Retires a stored drug with a non-blank reason and saves it.
    pub fn retire_drug(&mut self, drug: &mut Drug, reason: Option<&str>) -> DictionaryResult<Drug> {
        let reason = require_reason(reason)?;
        self.require_stored(&*drug)?;
        drug.mark_retired(reason);
        let saved = self.save_drug(drug)?;
        tracing::info!(drug_id = ?saved.id, reason, "retired drug");
        Ok(saved)
    }

    /// Clears the retired state of a drug.
    ///
    /// An active drug is returned untouched and nothing is written. The drug
    /// must be stored either way.
    pub fn unretire_drug(&mut self, drug: &mut Drug) -> DictionaryResult<Drug> {
        self.require_stored(&*drug)?;
        if !drug.retired {
            tracing::debug!(drug_id = ?drug.id, "drug already active");
            return Ok(drug.clone());
        }
        drug.mark_unretired();
        let saved = self.save_drug(drug)?;
        tracing::info!(drug_id = ?saved.id, "unretired drug");
        Ok(saved)
    }

    /// Deletes a drug that no coded answer uses.
    pub fn purge_drug(&mut self, drug: &Drug) -> DictionaryResult<()> {
        self.require_stored(drug)?;
        if self.repo.is_referenced(drug)? {
            tracing::warn!(drug_id = ?drug.id, "purge blocked, drug is referenced");
            return Err(DictionaryError::Conflict("Drug is in use".to_string()));
        }
        self.delete(drug)
    }

    // =========================================================================
    // Lookup entities
    // =========================================================================

    /// Stores a concept class.
    pub fn save_concept_class(&mut self, class: &mut ConceptClass) -> DictionaryResult<ConceptClass> {
        self.save_lookup(class)
    }

    /// Stores a concept datatype.
    pub fn save_concept_datatype(
        &mut self,
        datatype: &mut ConceptDatatype,
    ) -> DictionaryResult<ConceptDatatype> {
        self.save_lookup(datatype)
    }

    /// Stores a concept source.
    pub fn save_concept_source(
        &mut self,
        source: &mut ConceptSource,
    ) -> DictionaryResult<ConceptSource> {
        self.save_lookup(source)
    }

    /// Stores a concept map type.
    pub fn save_concept_map_type(
        &mut self,
        map_type: &mut ConceptMapType,
    ) -> DictionaryResult<ConceptMapType> {
        self.save_lookup(map_type)
    }

    /// Stores a concept name tag.
    pub fn save_concept_name_tag(
        &mut self,
        tag: &mut ConceptNameTag,
    ) -> DictionaryResult<ConceptNameTag> {
        self.save_lookup(tag)
    }

    /// Stores a reference term. Its source must exist.
    pub fn save_concept_reference_term(
        &mut self,
        term: &mut ConceptReferenceTerm,
    ) -> DictionaryResult<ConceptReferenceTerm> {
        let mut result = validate_reference_term(term);
        self.check_exists::<ConceptSource>(term.source, &mut result)?;
        result.into_result(EntityKind::ConceptReferenceTerm)?;
        self.store(term)
    }

    /// Stores a concept proposal. Concepts it points at must exist.
    pub fn save_concept_proposal(
        &mut self,
        proposal: &mut ConceptProposal,
    ) -> DictionaryResult<ConceptProposal> {
        let mut result = ValidationResult::new();
        for id in [proposal.obs_concept, proposal.mapped_concept].into_iter().flatten() {
            self.check_exists::<Concept>(id, &mut result)?;
        }
        result.into_result(EntityKind::ConceptProposal)?;
        self.store(proposal)
    }

    /// Deletes a concept class.
    pub fn purge_concept_class(&mut self, class: &ConceptClass) -> DictionaryResult<()> {
        self.purge_lookup(class)
    }

    /// Deletes a concept datatype.
    pub fn purge_concept_datatype(&mut self, datatype: &ConceptDatatype) -> DictionaryResult<()> {
        self.purge_lookup(datatype)
    }

    /// Deletes a concept source.
    pub fn purge_concept_source(&mut self, source: &ConceptSource) -> DictionaryResult<()> {
        self.purge_lookup(source)
    }

    /// Deletes a concept map type.
    pub fn purge_concept_map_type(&mut self, map_type: &ConceptMapType) -> DictionaryResult<()> {
        self.purge_lookup(map_type)
    }

    /// Deletes a concept proposal.
    pub fn purge_concept_proposal(&mut self, proposal: &ConceptProposal) -> DictionaryResult<()> {
        self.purge_lookup(proposal)
    }

    /// Deletes a concept name tag.
    pub fn purge_concept_name_tag(&mut self, tag: &ConceptNameTag) -> DictionaryResult<()> {
        self.purge_lookup(tag)
    }

    /// Deletes a reference term.
    ///
    /// When concept maps still use the term, [`PurgePolicy::Block`] refuses
    /// with "Reference term is in use" and [`PurgePolicy::Cascade`] removes
    /// those maps first.
    pub fn purge_concept_reference_term(
        &mut self,
        term: &ConceptReferenceTerm,
    ) -> DictionaryResult<()> {
        let id = self.require_stored(term)?;
        if self.repo.is_referenced(term)? {
            match self.config.reference_term_purge {
                PurgePolicy::Block => {
                    tracing::warn!(term_id = id, code = %term.code, "purge blocked, reference term is in use");
                    return Err(DictionaryError::Conflict(
                        "Reference term is in use".to_string(),
                    ));
                }
                PurgePolicy::Cascade => self.remove_mappings_to(id)?,
            }
        }
        self.delete(term)
    }

    fn remove_mappings_to(&mut self, term: EntityId) -> DictionaryResult<()> {
        let mapped = self.repo.query(
            &|concept: &Concept| concept.mappings.iter().any(|m| m.term == term),
            Page::all(),
        )?;
        for mut concept in mapped {
            concept.mappings.retain(|m| m.term != term);
            tracing::info!(concept_id = ?concept.id, term_id = term, "removed concept map");
            self.repo.upsert(concept)?;
        }
        Ok(())
    }

    // =========================================================================
    // Proposals
    // =========================================================================

    /// Maps a proposal to a concept.
    ///
    /// Fails when no concept is given, whatever the proposal's state.
    /// Otherwise:
    ///
    /// - rejected proposals lose any mapping and are saved as is
    /// - synonym proposals add their text as a name of the concept in
    ///   `locale`, then the concept is saved
    /// - other proposals are marked as mapped to the (saved) concept
    ///
    /// Returns the concept as stored.
    pub fn map_concept_proposal_to_concept(
        &mut self,
        proposal: &mut ConceptProposal,
        concept: Option<&mut Concept>,
        locale: &Locale,
    ) -> DictionaryResult<Concept> {
        let Some(concept) = concept else {
            return Err(DictionaryError::IllegalArgument(
                "Illegal mapped concept".to_string(),
            ));
        };

        match proposal.state {
            ProposalState::Reject => {
                proposal.mapped_concept = None;
                self.save_concept_proposal(proposal)?;
                tracing::info!(proposal_id = ?proposal.id, "rejected proposal");
                return Ok(concept.clone());
            }
            ProposalState::Synonym => {
                let text = proposal.effective_text().to_string();
                if text.is_empty() {
                    return Err(DictionaryError::IllegalArgument(
                        "proposal text is required".to_string(),
                    ));
                }
                let lowered = text.to_lowercase();
                let exists = concept
                    .names_in_locale(locale)
                    .any(|n| n.name.to_lowercase() == lowered);
                if !exists {
                    concept.add_name(ConceptName::new(text.clone(), locale.clone()));
                }
                self.save_concept(concept)?;
                proposal.final_text = Some(text);
            }
            ProposalState::Concept | ProposalState::Unmapped => {
                if !concept.is_saved() {
                    return Err(DictionaryError::NotFound {
                        kind: EntityKind::Concept,
                        id: None,
                    });
                }
                proposal.state = ProposalState::Concept;
            }
        }

        proposal.mapped_concept = concept.id;
        self.save_concept_proposal(proposal)?;
        tracing::info!(
            proposal_id = ?proposal.id,
            concept_id = ?concept.id,
            state = ?proposal.state,
            "mapped proposal to concept"
        );
        Ok(concept.clone())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn check_exists<E: Entity>(
        &self,
        id: EntityId,
        result: &mut ValidationResult,
    ) -> DictionaryResult<()> {
        if self.repo.find::<E>(id)?.is_none() {
            result.push(Violation::Dangling { kind: E::KIND, id });
        }
        Ok(())
    }

    fn require_stored<E: Entity>(&self, entity: &E) -> DictionaryResult<EntityId> {
        let id = entity.id().ok_or(DictionaryError::NotFound {
            kind: E::KIND,
            id: None,
        })?;
        if self.repo.find::<E>(id)?.is_none() {
            return Err(DictionaryError::NotFound {
                kind: E::KIND,
                id: Some(id),
            });
        }
        Ok(id)
    }

    fn save_lookup<E: Entity + Retireable>(&mut self, entity: &mut E) -> DictionaryResult<E> {
        validate_retirement(&*entity, E::KIND).into_result(E::KIND)?;
        self.store(entity)
    }

    fn store<E: Entity>(&mut self, entity: &mut E) -> DictionaryResult<E> {
        let saved = self.repo.upsert(entity.clone())?;
        tracing::debug!(kind = %E::KIND, id = ?saved.id(), "saved");
        *entity = saved.clone();
        Ok(saved)
    }

    fn purge_lookup<E: Entity>(&mut self, entity: &E) -> DictionaryResult<()> {
        self.require_stored(entity)?;
        self.delete(entity)
    }

    fn delete<E: Entity>(&mut self, entity: &E) -> DictionaryResult<()> {
        self.repo.delete(entity)?;
        tracing::info!(kind = %E::KIND, id = ?entity.id(), "purged");
        Ok(())
    }
}

fn require_reason(reason: Option<&str>) -> DictionaryResult<&str> {
    match reason {
        Some(reason) if !reason.trim().is_empty() => Ok(reason),
        _ => Err(DictionaryError::IllegalArgument(
            "retire reason is required".to_string(),
        )),
    }
}
