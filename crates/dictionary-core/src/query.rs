//! Read-only lookups and searches.
//!
//! The query service owns filter and ordering semantics; the repository only
//! scans. Lookups return `None` or an empty collection for absent values and
//! fail only when the caller passes an invalid argument or storage fails.

use std::collections::{BTreeSet, HashSet};
use std::slice;

use dictionary_types::{
    Concept, ConceptClass, ConceptDatatype, ConceptMapType, ConceptName, ConceptNameTag,
    ConceptProposal, ConceptReferenceTerm, ConceptSearchResult, ConceptSet, ConceptSource, Drug,
    EntityId, Locale, MatchKind,
};
use uuid::Uuid;

use crate::config::DictionaryConfig;
use crate::error::{DictionaryError, DictionaryResult};
use crate::repository::{Entity, Page, Repository};

/// Flags controlling how [`ConceptQueryService::get_drugs`] matches a phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrugSearchFlags {
    /// Also match when every word of the phrase occurs in the drug name, in
    /// any order.
    pub search_keywords: bool,
    /// Also match when a name of the drug's concept contains the phrase.
    pub search_drug_concept_names: bool,
    /// Include retired drugs.
    pub include_retired: bool,
}

impl DrugSearchFlags {
    /// Enables every matching strategy and includes retired drugs.
    pub fn everything() -> Self {
        Self {
            search_keywords: true,
            search_drug_concept_names: true,
            include_retired: true,
        }
    }

    /// Matches drug names only, active drugs only.
    pub fn names_only() -> Self {
        Self::default()
    }
}

/// Read-only operations on the dictionary.
///
/// # Example
///
/// ```
/// use dictionary_core::{ConceptQueryService, DictionaryConfig, InMemoryRepository};
///
/// let repo = InMemoryRepository::new();
/// let config = DictionaryConfig::default();
/// let query = ConceptQueryService::new(&repo, &config);
///
/// assert!(query.get_all_drugs(true).unwrap().is_empty());
/// assert!(query.get_drugs_by_ingredient(None).is_err());
/// ```
pub struct ConceptQueryService<'a, R: Repository> {
    repo: &'a R,
    config: &'a DictionaryConfig,
}

impl<'a, R: Repository> ConceptQueryService<'a, R> {
    /// Creates a service over the given repository.
    pub fn new(repo: &'a R, config: &'a DictionaryConfig) -> Self {
        Self { repo, config }
    }

    // =========================================================================
    // Concepts
    // =========================================================================

    /// Returns the concept with the given id.
    pub fn get_concept(&self, id: EntityId) -> DictionaryResult<Option<Concept>> {
        Ok(self.repo.find(id)?)
    }

    /// Returns the concept with the given uuid.
    pub fn get_concept_by_uuid(&self, uuid: &Uuid) -> DictionaryResult<Option<Concept>> {
        Ok(self.repo.find_by_uuid(uuid)?)
    }

    /// Returns a concept with a name equal to `name`, ignoring case.
    ///
    /// A concept whose preferred name matches wins over one where only some
    /// other name matches; ties go to the lowest id.
    pub fn get_concept_by_name(&self, name: &str) -> DictionaryResult<Option<Concept>> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return Ok(None);
        }
        let is_match = |n: &ConceptName| !n.voided && n.name.to_lowercase() == wanted;

        let candidates = self.repo.query(
            &|concept: &Concept| concept.names.iter().any(is_match),
            Page::all(),
        )?;
        let preferred = candidates
            .iter()
            .position(|c| c.names.iter().any(|n| n.locale_preferred && is_match(n)));
        Ok(match preferred {
            Some(i) => candidates.into_iter().nth(i),
            None => candidates.into_iter().next(),
        })
    }

    /// Returns the highest concept id in use.
    pub fn get_max_concept_id(&self) -> DictionaryResult<Option<EntityId>> {
        let concepts = self.repo.query(&|_: &Concept| true, Page::all())?;
        Ok(concepts.iter().filter_map(|c| c.id).max())
    }

    /// Returns the distinct locales of all non-voided concept names.
    pub fn get_locales_of_concept_names(&self) -> DictionaryResult<BTreeSet<Locale>> {
        let concepts = self.repo.query(&|_: &Concept| true, Page::all())?;
        Ok(concepts.iter().flat_map(Concept::locales).collect())
    }

    /// Returns the concept with the next lower id, if any.
    pub fn get_prev_concept(&self, concept: &Concept) -> DictionaryResult<Option<Concept>> {
        let Some(id) = concept.id else {
            return Ok(None);
        };
        let lower = self.repo.query(&|c: &Concept| c.id < Some(id), Page::all())?;
        Ok(lower.into_iter().last())
    }

    /// Returns the concept with the next higher id, if any.
    pub fn get_next_concept(&self, concept: &Concept) -> DictionaryResult<Option<Concept>> {
        let Some(id) = concept.id else {
            return Ok(None);
        };
        let higher = self
            .repo
            .query(&|c: &Concept| c.id > Some(id), Page::new(0, 1))?;
        Ok(higher.into_iter().next())
    }

    /// Returns the set-membership rows that list `concept` as a member.
    ///
    /// Empty for an unsaved concept.
    pub fn get_sets_containing_concept(&self, concept: &Concept) -> DictionaryResult<Vec<ConceptSet>> {
        let Some(id) = concept.id else {
            return Ok(Vec::new());
        };
        let sets = self.repo.query(
            &|c: &Concept| c.set_members.iter().any(|s| s.concept == id),
            Page::all(),
        )?;
        Ok(sets
            .into_iter()
            .flat_map(|set| set.set_members.into_iter().filter(move |s| s.concept == id))
            .collect())
    }

    /// Returns the question concepts that list `concept` as an answer.
    ///
    /// Empty for an unsaved concept.
    pub fn get_concepts_by_answer(&self, concept: &Concept) -> DictionaryResult<Vec<Concept>> {
        let Some(id) = concept.id else {
            return Ok(Vec::new());
        };
        Ok(self
            .repo
            .query(&|c: &Concept| c.has_answer(id), Page::all())?)
    }

    /// Returns concepts that have at least one active drug.
    pub fn get_concepts_with_drugs_in_formulary(&self) -> DictionaryResult<Vec<Concept>> {
        let drugs = self.repo.query(&|d: &Drug| !d.retired, Page::all())?;
        let ids: HashSet<EntityId> = drugs.iter().map(|d| d.concept).collect();
        Ok(self.repo.query(
            &|c: &Concept| c.id.is_some_and(|id| ids.contains(&id)),
            Page::all(),
        )?)
    }

    /// Searches concept names in `locale` for `phrase`.
    ///
    /// A name matches when it equals, starts with or contains the phrase,
    /// ignoring case. Names match the locale when the language is the same and
    /// the regions do not conflict. Each concept appears once, with the best
    /// matching name (the preferred name on a tie), and results are ordered
    /// by match strength, then id. A blank phrase matches nothing.
    ///
    /// The matched name is not necessarily the concept's preferred name.
    pub fn get_concepts(
        &self,
        phrase: &str,
        locale: &Locale,
        include_retired: bool,
    ) -> DictionaryResult<Vec<ConceptSearchResult>> {
        self.search_concepts(phrase, slice::from_ref(locale), |c| include_retired || !c.retired)
    }

    /// Searches the answers of `question` for `phrase`, like
    /// [`get_concepts`](Self::get_concepts). Retired answers are skipped.
    pub fn find_concept_answers(
        &self,
        phrase: &str,
        locale: &Locale,
        question: &Concept,
    ) -> DictionaryResult<Vec<ConceptSearchResult>> {
        let answers: HashSet<EntityId> = question.answers.iter().map(|a| a.answer_concept).collect();
        self.search_concepts(phrase, slice::from_ref(locale), |c| {
            !c.retired && c.id.is_some_and(|id| answers.contains(&id))
        })
    }

    /// Searches concepts that can be ordered.
    ///
    /// A concept is orderable when it has a drug, or when its class is one of
    /// [`DictionaryConfig::orderable_classes`]. Retired drugs count only with
    /// `include_retired`. An empty `locales` slice matches names in any
    /// locale. `start` and `length` page the ranked results; a missing or zero
    /// length means the configured maximum.
    pub fn get_orderable_concepts(
        &self,
        phrase: &str,
        locales: &[Locale],
        include_retired: bool,
        start: usize,
        length: Option<usize>,
    ) -> DictionaryResult<Vec<ConceptSearchResult>> {
        let drugs = self
            .repo
            .query(&|d: &Drug| include_retired || !d.retired, Page::all())?;
        let with_drugs: HashSet<EntityId> = drugs.iter().map(|d| d.concept).collect();
        let classes = self.repo.query(
            &|c: &ConceptClass| self.config.is_orderable_class(&c.name),
            Page::all(),
        )?;
        let orderable_classes: HashSet<EntityId> = classes.iter().filter_map(|c| c.id).collect();

        let results = self.search_concepts(phrase, locales, |c| {
            (include_retired || !c.retired)
                && (c.id.is_some_and(|id| with_drugs.contains(&id))
                    || c.concept_class.is_some_and(|id| orderable_classes.contains(&id)))
        })?;
        let page = Page::new(start, self.config.page_length(length));
        Ok(page.apply(results.into_iter()))
    }

    fn search_concepts(
        &self,
        phrase: &str,
        locales: &[Locale],
        accept: impl Fn(&Concept) -> bool,
    ) -> DictionaryResult<Vec<ConceptSearchResult>> {
        let word = phrase.trim();
        if word.is_empty() {
            return Ok(Vec::new());
        }

        let concepts = self.repo.query(&|c: &Concept| accept(c), Page::all())?;
        let mut results: Vec<ConceptSearchResult> = concepts
            .into_iter()
            .filter_map(|concept| {
                let (match_kind, name) = best_match(&concept, word, locales)?;
                let concept_name = name.clone();
                Some(ConceptSearchResult {
                    word: word.to_string(),
                    concept,
                    concept_name,
                    match_kind,
                })
            })
            .collect();

        results.sort_by_key(|r| (r.match_kind, r.concept.id));
        results.truncate(self.config.max_results);
        tracing::debug!(phrase = word, locales = ?locales, hits = results.len(), "concept search");
        Ok(results)
    }

    // =========================================================================
    // Drugs
    // =========================================================================

    /// Returns the drug with the given id.
    pub fn get_drug(&self, id: EntityId) -> DictionaryResult<Option<Drug>> {
        Ok(self.repo.find(id)?)
    }

    /// Returns the drug with the given uuid.
    pub fn get_drug_by_uuid(&self, uuid: &Uuid) -> DictionaryResult<Option<Drug>> {
        Ok(self.repo.find_by_uuid(uuid)?)
    }

    /// Returns the first drug named `name`, ignoring case.
    pub fn get_drug_by_name(&self, name: &str) -> DictionaryResult<Option<Drug>> {
        let wanted = name.trim().to_lowercase();
        let drugs = self
            .repo
            .query(&|d: &Drug| d.name.to_lowercase() == wanted, Page::new(0, 1))?;
        Ok(drugs.into_iter().next())
    }

    /// Returns all drugs, ascending by id.
    pub fn get_all_drugs(&self, include_retired: bool) -> DictionaryResult<Vec<Drug>> {
        self.all(include_retired)
    }

    /// Searches drugs.
    ///
    /// `phrase` of `None` or blank matches every drug. `concept` of `None`
    /// matches every concept; otherwise only drugs of that concept match, and
    /// an unsaved concept matches nothing. `start` and `length` apply after
    /// filtering; a missing or zero length means the configured maximum.
    pub fn get_drugs(
        &self,
        phrase: Option<&str>,
        concept: Option<&Concept>,
        flags: DrugSearchFlags,
        start: usize,
        length: Option<usize>,
    ) -> DictionaryResult<Vec<Drug>> {
        let page = Page::new(start, self.config.page_length(length));
        let Some(filter) = self.drug_filter(phrase, concept, flags)? else {
            return Ok(Vec::new());
        };
        let drugs = self.repo.query(&|d: &Drug| filter.accepts(d), page)?;
        tracing::debug!(phrase, start, hits = drugs.len(), "drug search");
        Ok(drugs)
    }

    /// Counts the drugs [`get_drugs`](Self::get_drugs) would match, ignoring
    /// pagination.
    pub fn get_count_of_drugs(
        &self,
        phrase: Option<&str>,
        concept: Option<&Concept>,
        flags: DrugSearchFlags,
    ) -> DictionaryResult<usize> {
        let Some(filter) = self.drug_filter(phrase, concept, flags)? else {
            return Ok(0);
        };
        Ok(self.repo.count(&|d: &Drug| filter.accepts(d))?)
    }

    /// Returns drugs whose generic concept or ingredients include `ingredient`.
    ///
    /// Fails when no ingredient is given.
    pub fn get_drugs_by_ingredient(&self, ingredient: Option<&Concept>) -> DictionaryResult<Vec<Drug>> {
        let ingredient = ingredient.ok_or_else(|| {
            DictionaryError::IllegalArgument("ingredient is required".to_string())
        })?;
        let Some(id) = ingredient.id else {
            return Ok(Vec::new());
        };
        Ok(self.repo.query(
            &|d: &Drug| d.concept == id || d.has_ingredient(id),
            Page::all(),
        )?)
    }

    /// Builds the drug filter, or `None` when nothing can match.
    fn drug_filter(
        &self,
        phrase: Option<&str>,
        concept: Option<&Concept>,
        flags: DrugSearchFlags,
    ) -> DictionaryResult<Option<DrugFilter>> {
        let concept = match concept {
            Some(c) => match c.id {
                Some(id) => Some(id),
                None => return Ok(None),
            },
            None => None,
        };
        let phrase = phrase
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty());

        let mut concept_name_hits = HashSet::new();
        if let (Some(phrase), true) = (&phrase, flags.search_drug_concept_names) {
            let named = self.repo.query(
                &|c: &Concept| {
                    c.names
                        .iter()
                        .any(|n| !n.voided && n.name.to_lowercase().contains(phrase.as_str()))
                },
                Page::all(),
            )?;
            concept_name_hits.extend(named.iter().filter_map(|c| c.id));
        }

        Ok(Some(DrugFilter {
            phrase,
            concept,
            flags,
            concept_name_hits,
        }))
    }

    // =========================================================================
    // Lookup entities
    // =========================================================================

    /// Returns the concept class with the given id.
    pub fn get_concept_class(&self, id: EntityId) -> DictionaryResult<Option<ConceptClass>> {
        Ok(self.repo.find(id)?)
    }

    /// Returns all concept classes, ordered by name.
    pub fn get_all_concept_classes(&self, include_retired: bool) -> DictionaryResult<Vec<ConceptClass>> {
        let mut classes: Vec<ConceptClass> = self.all(include_retired)?;
        classes.sort_by_key(|c| c.name.to_lowercase());
        Ok(classes)
    }

    /// Returns the concept datatype with the given id.
    pub fn get_concept_datatype(&self, id: EntityId) -> DictionaryResult<Option<ConceptDatatype>> {
        Ok(self.repo.find(id)?)
    }

    /// Returns the datatype with the given HL7 abbreviation.
    pub fn get_concept_datatype_by_abbreviation(
        &self,
        abbreviation: &str,
    ) -> DictionaryResult<Option<ConceptDatatype>> {
        let found = self.repo.query(
            &|d: &ConceptDatatype| d.hl7_abbreviation.eq_ignore_ascii_case(abbreviation),
            Page::new(0, 1),
        )?;
        Ok(found.into_iter().next())
    }

    /// Returns all concept datatypes, ordered by name.
    pub fn get_all_concept_datatypes(
        &self,
        include_retired: bool,
    ) -> DictionaryResult<Vec<ConceptDatatype>> {
        let mut datatypes: Vec<ConceptDatatype> = self.all(include_retired)?;
        datatypes.sort_by_key(|d| d.name.to_lowercase());
        Ok(datatypes)
    }

    /// Returns the concept source with the given id.
    pub fn get_concept_source(&self, id: EntityId) -> DictionaryResult<Option<ConceptSource>> {
        Ok(self.repo.find(id)?)
    }

    /// Returns all concept sources, ascending by id.
    pub fn get_all_concept_sources(&self, include_retired: bool) -> DictionaryResult<Vec<ConceptSource>> {
        self.all(include_retired)
    }

    /// Returns the concept map type with the given id.
    pub fn get_concept_map_type(&self, id: EntityId) -> DictionaryResult<Option<ConceptMapType>> {
        Ok(self.repo.find(id)?)
    }

    /// Returns all concept map types, ascending by id.
    pub fn get_all_concept_map_types(
        &self,
        include_retired: bool,
    ) -> DictionaryResult<Vec<ConceptMapType>> {
        self.all(include_retired)
    }

    /// Returns the reference term with the given id.
    pub fn get_concept_reference_term(
        &self,
        id: EntityId,
    ) -> DictionaryResult<Option<ConceptReferenceTerm>> {
        Ok(self.repo.find(id)?)
    }

    /// Returns all reference terms, ascending by id.
    pub fn get_all_concept_reference_terms(
        &self,
        include_retired: bool,
    ) -> DictionaryResult<Vec<ConceptReferenceTerm>> {
        self.all(include_retired)
    }

    /// Returns the term of `source` whose name equals `name`, ignoring case.
    ///
    /// `None` when no name is given.
    pub fn get_concept_reference_term_by_name(
        &self,
        name: Option<&str>,
        source: &ConceptSource,
    ) -> DictionaryResult<Option<ConceptReferenceTerm>> {
        let (Some(name), Some(source)) = (name.map(str::trim), source.id) else {
            return Ok(None);
        };
        let wanted = name.to_lowercase();
        let found = self.repo.query(
            &|t: &ConceptReferenceTerm| {
                t.source == source
                    && t.name.as_deref().is_some_and(|n| n.trim().to_lowercase() == wanted)
            },
            Page::new(0, 1),
        )?;
        Ok(found.into_iter().next())
    }

    /// Returns the term of `source` with the given code, ignoring case.
    pub fn get_concept_reference_term_by_code(
        &self,
        code: &str,
        source: &ConceptSource,
    ) -> DictionaryResult<Option<ConceptReferenceTerm>> {
        let Some(source) = source.id else {
            return Ok(None);
        };
        let code = code.trim();
        let found = self.repo.query(
            &|t: &ConceptReferenceTerm| t.source == source && t.code.eq_ignore_ascii_case(code),
            Page::new(0, 1),
        )?;
        Ok(found.into_iter().next())
    }

    /// Returns the proposal with the given id.
    pub fn get_concept_proposal(&self, id: EntityId) -> DictionaryResult<Option<ConceptProposal>> {
        Ok(self.repo.find(id)?)
    }

    /// Returns proposals, ascending by id. Completed proposals are included
    /// only when `include_completed` is set.
    pub fn get_all_concept_proposals(
        &self,
        include_completed: bool,
    ) -> DictionaryResult<Vec<ConceptProposal>> {
        self.all(include_completed)
    }

    /// Returns the name tag with the given id.
    pub fn get_concept_name_tag(&self, id: EntityId) -> DictionaryResult<Option<ConceptNameTag>> {
        Ok(self.repo.find(id)?)
    }

    /// Returns every name tag, retired ones included.
    pub fn get_all_concept_name_tags(&self) -> DictionaryResult<Vec<ConceptNameTag>> {
        self.all(true)
    }

    /// Returns the name tag with the given text, ignoring case.
    pub fn get_concept_name_tag_by_name(&self, tag: &str) -> DictionaryResult<Option<ConceptNameTag>> {
        let found = self.repo.query(
            &|t: &ConceptNameTag| t.tag.eq_ignore_ascii_case(tag.trim()),
            Page::new(0, 1),
        )?;
        Ok(found.into_iter().next())
    }

    fn all<E: Entity>(&self, include_retired: bool) -> DictionaryResult<Vec<E>> {
        Ok(self
            .repo
            .query(&|e: &E| include_retired || !e.is_retired(), Page::all())?)
    }
}

/// Picks the strongest matching name of a concept in any of `locales`.
///
/// No locales means any locale.
fn best_match<'c>(
    concept: &'c Concept,
    phrase: &str,
    locales: &[Locale],
) -> Option<(MatchKind, &'c ConceptName)> {
    concept
        .names
        .iter()
        .filter(|n| !n.voided && (locales.is_empty() || locales.iter().any(|l| n.locale.matches(l))))
        .filter_map(|n| MatchKind::classify(&n.name, phrase).map(|kind| (kind, n)))
        .min_by_key(|(kind, n)| (*kind, !n.locale_preferred))
}

struct DrugFilter {
    phrase: Option<String>,
    concept: Option<EntityId>,
    flags: DrugSearchFlags,
    concept_name_hits: HashSet<EntityId>,
}

impl DrugFilter {
    fn accepts(&self, drug: &Drug) -> bool {
        if drug.retired && !self.flags.include_retired {
            return false;
        }
        if self.concept.is_some_and(|id| drug.concept != id) {
            return false;
        }
        let Some(phrase) = &self.phrase else {
            return true;
        };

        let name = drug.name.to_lowercase();
        if name.contains(phrase.as_str()) {
            return true;
        }
        if self.flags.search_keywords && phrase.split_whitespace().all(|word| name.contains(word)) {
            return true;
        }
        self.flags.search_drug_concept_names && self.concept_name_hits.contains(&drug.concept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use dictionary_types::{ConceptNameType, ProposalState};

    fn en_gb() -> Locale {
        Locale::new("en", "GB")
    }

    fn concept(repo: &mut InMemoryRepository, names: &[(&str, ConceptNameType, bool)]) -> Concept {
        let mut concept = Concept::new();
        for (text, name_type, preferred) in names {
            let mut name = ConceptName::new(*text, en_gb()).with_type(*name_type);
            name.locale_preferred = *preferred;
            concept.add_name(name);
        }
        repo.upsert(concept).unwrap()
    }

    fn simple(repo: &mut InMemoryRepository, text: &str) -> Concept {
        concept(repo, &[(text, ConceptNameType::FullySpecified, true)])
    }

    #[test]
    fn test_get_concept_lookups() {
        let mut repo = InMemoryRepository::new();
        let cd4 = concept(
            &mut repo,
            &[
                ("CD4 COUNT", ConceptNameType::FullySpecified, true),
                ("CD4", ConceptNameType::Short, false),
            ],
        );
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        assert_eq!(query.get_concept(cd4.id.unwrap()).unwrap(), Some(cd4.clone()));
        assert_eq!(query.get_concept_by_uuid(&cd4.uuid).unwrap(), Some(cd4.clone()));
        assert_eq!(query.get_concept_by_name("cd4 count").unwrap(), Some(cd4.clone()));
        assert_eq!(query.get_concept_by_name("CD4").unwrap(), Some(cd4));
        assert_eq!(query.get_concept_by_name("viral load").unwrap(), None);
        assert_eq!(query.get_concept(999).unwrap(), None);
    }

    #[test]
    fn test_concept_by_name_prefers_preferred_name() {
        let mut repo = InMemoryRepository::new();
        concept(
            &mut repo,
            &[
                ("Fever finding", ConceptNameType::FullySpecified, true),
                ("Fever", ConceptNameType::Synonym, false),
            ],
        );
        let fever = simple(&mut repo, "Fever");
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        assert_eq!(query.get_concept_by_name("fever").unwrap(), Some(fever));
    }

    #[test]
    fn test_max_id_and_neighbours() {
        let mut repo = InMemoryRepository::new();
        let a = simple(&mut repo, "A");
        let b = simple(&mut repo, "B");
        let c = simple(&mut repo, "C");
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        assert_eq!(query.get_max_concept_id().unwrap(), c.id);
        assert_eq!(query.get_prev_concept(&b).unwrap(), Some(a.clone()));
        assert_eq!(query.get_next_concept(&b).unwrap(), Some(c.clone()));
        assert_eq!(query.get_prev_concept(&a).unwrap(), None);
        assert_eq!(query.get_next_concept(&c).unwrap(), None);
        assert_eq!(query.get_next_concept(&Concept::new()).unwrap(), None);
    }

    #[test]
    fn test_locales_of_concept_names() {
        let mut repo = InMemoryRepository::new();
        let mut concept = Concept::new();
        concept.add_name(ConceptName::new("Fever", en_gb()));
        concept.add_name(ConceptName::new("Fièvre", Locale::new("fr", "CA")));
        let mut voided = ConceptName::new("Fiebre", Locale::from_language("es"));
        voided.voided = true;
        concept.add_name(voided);
        repo.upsert(concept).unwrap();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        let locales = query.get_locales_of_concept_names().unwrap();
        assert_eq!(locales.len(), 2);
        assert!(locales.contains(&Locale::new("fr", "CA")));
        assert!(!locales.contains(&Locale::from_language("es")));
    }

    #[test]
    fn test_sets_and_answers_for_unsaved_concept_are_empty() {
        let repo = InMemoryRepository::new();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);
        let unsaved = Concept::new();

        assert!(query.get_sets_containing_concept(&unsaved).unwrap().is_empty());
        assert!(query.get_concepts_by_answer(&unsaved).unwrap().is_empty());
    }

    #[test]
    fn test_sets_containing_concept() {
        let mut repo = InMemoryRepository::new();
        let member = simple(&mut repo, "member");
        let other = simple(&mut repo, "other");
        let mut set = Concept::new();
        set.add_name(ConceptName::new("set", en_gb()));
        set.add_set_member(other.id.unwrap());
        set.add_set_member(member.id.unwrap());
        let set = repo.upsert(set).unwrap();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        let sets = query.get_sets_containing_concept(&member).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].concept_set, set.id);
        assert_eq!(sets[0].sort_weight, 2);

        let lonely = simple(&mut repo, "lonely");
        let query = ConceptQueryService::new(&repo, &config);
        assert!(query.get_sets_containing_concept(&lonely).unwrap().is_empty());
    }

    #[test]
    fn test_concepts_by_answer() {
        let mut repo = InMemoryRepository::new();
        let yes = simple(&mut repo, "Yes");
        let mut question = Concept::new();
        question.add_name(ConceptName::new("Pregnant?", en_gb()));
        question.add_answer(yes.id.unwrap(), None);
        let question = repo.upsert(question).unwrap();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        assert_eq!(query.get_concepts_by_answer(&yes).unwrap(), vec![question]);
    }

    #[test]
    fn test_get_concepts_search() {
        let mut repo = InMemoryRepository::new();
        let count = concept(
            &mut repo,
            &[
                ("CD4 PERCENT", ConceptNameType::FullySpecified, true),
                ("CD4 COUNT", ConceptNameType::Synonym, false),
            ],
        );
        let panel = simple(&mut repo, "ABSOLUTE CD4 COUNT");
        let mut retired = simple(&mut repo, "CD4 COUNT OLD");
        retired.retired = true;
        retired.retire_reason = Some("duplicate".to_string());
        repo.upsert(retired).unwrap();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        let results = query.get_concepts("CD4 COUNT", &en_gb(), false).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].concept.id, count.id);
        assert_eq!(results[0].concept_name.name, "CD4 COUNT");
        assert!(!results[0].concept_name.locale_preferred);
        assert_eq!(results[0].match_kind, MatchKind::Exact);
        assert_eq!(results[1].concept.id, panel.id);
        assert_eq!(results[1].match_kind, MatchKind::Contains);

        assert_eq!(query.get_concepts("cd4 count", &en_gb(), true).unwrap().len(), 3);
        assert!(query.get_concepts("   ", &en_gb(), true).unwrap().is_empty());
    }

    #[test]
    fn test_get_concepts_locale_matching() {
        let mut repo = InMemoryRepository::new();
        simple(&mut repo, "Fever");
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        assert_eq!(query.get_concepts("fever", &Locale::from_language("en"), false).unwrap().len(), 1);
        assert!(query.get_concepts("fever", &Locale::new("en", "US"), false).unwrap().is_empty());
        assert!(query.get_concepts("fever", &Locale::from_language("fr"), false).unwrap().is_empty());
    }

    #[test]
    fn test_search_is_capped() {
        let mut repo = InMemoryRepository::new();
        for n in 0..5 {
            simple(&mut repo, &format!("Malaria {n}"));
        }
        let config = DictionaryConfig {
            max_results: 3,
            ..Default::default()
        };
        let query = ConceptQueryService::new(&repo, &config);

        assert_eq!(query.get_concepts("malaria", &en_gb(), false).unwrap().len(), 3);
    }

    #[test]
    fn test_find_concept_answers() {
        let mut repo = InMemoryRepository::new();
        let answer = simple(&mut repo, "CD4 COUNT");
        simple(&mut repo, "CD4 COUNT TOO");
        let mut question = Concept::new();
        question.add_name(ConceptName::new("Which test?", en_gb()));
        question.add_answer(answer.id.unwrap(), None);
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        let results = query.find_concept_answers("CD4 COUNT", &en_gb(), &question).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].concept_name.name, "CD4 COUNT");
    }

    fn classed(repo: &mut InMemoryRepository, text: &str, class: &ConceptClass) -> Concept {
        let mut concept = Concept::new();
        concept.add_name(ConceptName::new(text, en_gb()).with_type(ConceptNameType::FullySpecified));
        concept.concept_class = class.id;
        repo.upsert(concept).unwrap()
    }

    #[test]
    fn test_get_orderable_concepts() {
        let mut repo = InMemoryRepository::new();
        let test = repo.upsert(ConceptClass::new("Test")).unwrap();
        let diagnosis = repo.upsert(ConceptClass::new("Diagnosis")).unwrap();
        let count = classed(&mut repo, "CD4 COUNT", &test);
        let percent = classed(&mut repo, "CD4 PERCENT", &test);
        classed(&mut repo, "Malaria", &diagnosis);
        let triomune = classed(&mut repo, "Triomune", &diagnosis);
        repo.upsert(Drug::new("Triomune-30", triomune.id.unwrap())).unwrap();
        let aspirin = classed(&mut repo, "Aspirin", &diagnosis);
        let mut withdrawn = Drug::new("Aspirin Forte", aspirin.id.unwrap());
        withdrawn.retired = true;
        repo.upsert(withdrawn).unwrap();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        assert!(query
            .get_orderable_concepts("some phrase", &[], true, 0, Some(10))
            .unwrap()
            .is_empty());
        assert!(query.get_orderable_concepts("malaria", &[], true, 0, None).unwrap().is_empty());

        let tests = query.get_orderable_concepts("cd4", &[en_gb()], false, 0, None).unwrap();
        let ids: Vec<_> = tests.iter().map(|r| r.concept.id).collect();
        assert_eq!(ids, vec![count.id, percent.id]);

        let second = query.get_orderable_concepts("cd4", &[], false, 1, Some(1)).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].concept.id, percent.id);

        let drugs = query.get_orderable_concepts("triomune", &[], false, 0, None).unwrap();
        assert_eq!(drugs[0].concept.id, triomune.id);
        assert!(query.get_orderable_concepts("aspirin", &[], false, 0, None).unwrap().is_empty());
        assert_eq!(query.get_orderable_concepts("aspirin", &[], true, 0, None).unwrap().len(), 1);
        assert!(query
            .get_orderable_concepts("cd4", &[Locale::from_language("fr")], false, 0, None)
            .unwrap()
            .is_empty());
    }

    fn drug_fixture() -> (InMemoryRepository, Concept, Concept) {
        let mut repo = InMemoryRepository::new();
        let triomune = simple(&mut repo, "Triomune");
        let aspirin = simple(&mut repo, "Acetylsalicylic acid");
        let lamivudine = simple(&mut repo, "Lamivudine");

        let mut drug = Drug::new("Triomune-30", triomune.id.unwrap());
        drug.ingredients.push(lamivudine.id.unwrap());
        repo.upsert(drug).unwrap();
        repo.upsert(Drug::new("Triomune-40", triomune.id.unwrap())).unwrap();
        repo.upsert(Drug::new("ASPIRIN", aspirin.id.unwrap())).unwrap();
        let mut retired = Drug::new("Aspirin Forte", aspirin.id.unwrap());
        retired.retired = true;
        retired.retire_reason = Some("withdrawn".to_string());
        repo.upsert(retired).unwrap();

        (repo, triomune, lamivudine)
    }

    #[test]
    fn test_get_all_drugs() {
        let (repo, _, _) = drug_fixture();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        assert_eq!(query.get_all_drugs(true).unwrap().len(), 4);
        assert_eq!(query.get_all_drugs(false).unwrap().len(), 3);
        assert_eq!(query.get_drug_by_name("aspirin").unwrap().map(|d| d.name), Some("ASPIRIN".to_string()));
        assert_eq!(query.get_drug_by_name("paracetamol").unwrap(), None);
        assert_eq!(query.get_drug(99).unwrap(), None);
    }

    #[test]
    fn test_get_drugs_filters() {
        let (repo, triomune, _) = drug_fixture();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        let by_concept = query
            .get_drugs(Some("Triomune-30"), Some(&triomune), DrugSearchFlags::everything(), 0, None)
            .unwrap();
        assert_eq!(by_concept.len(), 1);
        assert_eq!(by_concept[0].name, "Triomune-30");

        let any = query
            .get_drugs(Some("aspirin"), None, DrugSearchFlags::names_only(), 0, None)
            .unwrap();
        assert_eq!(any.len(), 1);

        let with_retired = query
            .get_drugs(Some("aspirin"), None, DrugSearchFlags::everything(), 0, None)
            .unwrap();
        assert_eq!(with_retired.len(), 2);

        assert!(query
            .get_drugs(None, Some(&Concept::new()), DrugSearchFlags::everything(), 0, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_get_drugs_keyword_and_concept_name_search() {
        let (repo, _, _) = drug_fixture();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        let keywords = DrugSearchFlags {
            search_keywords: true,
            ..Default::default()
        };
        assert!(query.get_drugs(Some("forte aspirin"), None, DrugSearchFlags::names_only(), 0, None).unwrap().is_empty());
        let hits = query
            .get_drugs(Some("forte aspirin"), None, DrugSearchFlags { include_retired: true, ..keywords }, 0, None)
            .unwrap();
        assert_eq!(hits.len(), 1);

        let concept_names = DrugSearchFlags {
            search_drug_concept_names: true,
            ..Default::default()
        };
        let hits = query.get_drugs(Some("salicylic"), None, concept_names, 0, None).unwrap();
        assert_eq!(hits.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(), vec!["ASPIRIN"]);
    }

    #[test]
    fn test_get_drugs_pagination() {
        let (repo, _, _) = drug_fixture();
        let config = DictionaryConfig {
            max_results: 2,
            ..Default::default()
        };
        let query = ConceptQueryService::new(&repo, &config);
        let flags = DrugSearchFlags::everything();

        assert_eq!(query.get_drugs(None, None, flags, 0, None).unwrap().len(), 2);
        assert_eq!(query.get_drugs(None, None, flags, 0, Some(0)).unwrap().len(), 2);
        assert_eq!(query.get_drugs(None, None, flags, 0, Some(50)).unwrap().len(), 2);
        let page = query.get_drugs(None, None, flags, 3, Some(1)).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Aspirin Forte");
        assert_eq!(query.get_count_of_drugs(None, None, flags).unwrap(), 4);
    }

    #[test]
    fn test_count_of_drugs() {
        let (repo, triomune, _) = drug_fixture();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        assert_eq!(
            query
                .get_count_of_drugs(Some("Triomune-30"), Some(&triomune), DrugSearchFlags::everything())
                .unwrap(),
            1
        );
        assert_eq!(
            query
                .get_count_of_drugs(Some("Triomune"), Some(&triomune), DrugSearchFlags::everything())
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_drugs_by_ingredient() {
        let (repo, triomune, lamivudine) = drug_fixture();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        let err = query.get_drugs_by_ingredient(None).unwrap_err();
        assert!(matches!(err, DictionaryError::IllegalArgument(_)));
        assert_eq!(err.to_string(), "ingredient is required");

        assert_eq!(query.get_drugs_by_ingredient(Some(&lamivudine)).unwrap().len(), 1);
        assert_eq!(query.get_drugs_by_ingredient(Some(&triomune)).unwrap().len(), 2);
        assert!(query.get_drugs_by_ingredient(Some(&Concept::new())).unwrap().is_empty());
    }

    #[test]
    fn test_concepts_with_drugs_in_formulary() {
        let (mut repo, triomune, _) = drug_fixture();
        let orphan = simple(&mut repo, "Orphan");
        let mut retired = Drug::new("Orphan drug", orphan.id.unwrap());
        retired.retired = true;
        repo.upsert(retired).unwrap();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        let concepts = query.get_concepts_with_drugs_in_formulary().unwrap();
        let ids: Vec<_> = concepts.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&triomune.id));
        assert!(!ids.contains(&orphan.id));
    }

    #[test]
    fn test_classes_and_datatypes_sorted_by_name() {
        let mut repo = InMemoryRepository::new();
        repo.upsert(ConceptClass::new("Test")).unwrap();
        repo.upsert(ConceptClass::new("Diagnosis")).unwrap();
        let mut retired = ConceptClass::new("Anatomy");
        retired.retired = true;
        retired.retire_reason = Some("unused".to_string());
        repo.upsert(retired).unwrap();
        repo.upsert(ConceptDatatype::new("Text", "ST")).unwrap();
        repo.upsert(ConceptDatatype::new("Coded", "CWE")).unwrap();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        let names: Vec<String> = query
            .get_all_concept_classes(true)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Anatomy", "Diagnosis", "Test"]);
        assert_eq!(query.get_all_concept_classes(false).unwrap().len(), 2);

        let datatypes = query.get_all_concept_datatypes(false).unwrap();
        assert_eq!(datatypes[0].name, "Coded");
        assert_eq!(
            query.get_concept_datatype_by_abbreviation("st").unwrap().map(|d| d.name),
            Some("Text".to_string())
        );
    }

    #[test]
    fn test_sources_map_types_and_terms() {
        let mut repo = InMemoryRepository::new();
        let loinc = repo.upsert(ConceptSource::new("LOINC")).unwrap();
        let mut retired = ConceptSource::new("Old");
        retired.retired = true;
        retired.retire_reason = Some("gone".to_string());
        repo.upsert(retired).unwrap();
        repo.upsert(ConceptMapType::new("SAME-AS")).unwrap();
        repo.upsert(ConceptReferenceTerm::new("24656-8", loinc.id.unwrap()).with_name("CD4 count"))
            .unwrap();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        assert_eq!(query.get_all_concept_sources(true).unwrap().len(), 2);
        assert_eq!(query.get_all_concept_sources(false).unwrap().len(), 1);
        assert_eq!(query.get_all_concept_map_types(false).unwrap().len(), 1);
        assert_eq!(query.get_all_concept_reference_terms(false).unwrap().len(), 1);

        let by_name = query
            .get_concept_reference_term_by_name(Some("cd4 COUNT"), &loinc)
            .unwrap();
        assert_eq!(by_name.map(|t| t.code), Some("24656-8".to_string()));
        assert!(query
            .get_concept_reference_term_by_name(Some("no such term"), &loinc)
            .unwrap()
            .is_none());
        assert!(query
            .get_concept_reference_term_by_name(None, &loinc)
            .unwrap()
            .is_none());
        assert!(query
            .get_concept_reference_term_by_code("24656-8", &loinc)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_proposals_and_name_tags() {
        let mut repo = InMemoryRepository::new();
        repo.upsert(ConceptProposal::new("Feverish")).unwrap();
        let mut done = ConceptProposal::new("Headache");
        done.state = ProposalState::Reject;
        repo.upsert(done).unwrap();
        repo.upsert(ConceptNameTag::new("default")).unwrap();
        let mut retired = ConceptNameTag::new("old");
        retired.retired = true;
        repo.upsert(retired).unwrap();
        let config = DictionaryConfig::default();
        let query = ConceptQueryService::new(&repo, &config);

        assert_eq!(query.get_all_concept_proposals(true).unwrap().len(), 2);
        assert_eq!(query.get_all_concept_proposals(false).unwrap().len(), 1);
        assert_eq!(query.get_all_concept_name_tags().unwrap().len(), 2);
        assert!(query.get_concept_name_tag_by_name("DEFAULT").unwrap().is_some());
        assert!(query.get_concept_name_tag_by_name("missing").unwrap().is_none());
    }
}
