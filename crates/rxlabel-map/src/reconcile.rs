//! Drug name to labelled indications, end to end.

use std::cmp::Ordering;

use rxlabel_model::{
    EngineOptions, Icd10Entry, IndexError, LabelRecord, MatchResult, ResolveError, ResolvedDrug,
    SearchCandidate, SelectionPolicy, SynonymEntry,
};
use tracing::{debug, info_span};

use crate::icd10::Icd10Index;
use crate::matcher::IndicationMatcher;
use crate::search::DrugSearchIndex;
use crate::synonyms::SynonymExpander;

/// Composes search, selection, and indication matching.
///
/// Holds only immutable indexes, so one instance can serve concurrent
/// queries by shared reference.
#[derive(Debug, Clone)]
pub struct Reconciler {
    search: DrugSearchIndex,
    icd10: Icd10Index,
    expander: SynonymExpander,
    matcher: IndicationMatcher,
}

impl Reconciler {
    pub fn new(
        search: DrugSearchIndex,
        icd10: Icd10Index,
        expander: SynonymExpander,
        matcher: IndicationMatcher,
    ) -> Self {
        Self {
            search,
            icd10,
            expander,
            matcher,
        }
    }

    /// Build every index from raw inputs. Synonyms are merged over the
    /// built-in dictionary.
    pub fn build(
        records: Vec<LabelRecord>,
        entries: Vec<Icd10Entry>,
        synonyms: &[SynonymEntry],
        options: EngineOptions,
    ) -> Result<Self, IndexError> {
        let EngineOptions { matcher, search } = options;
        Ok(Self::new(
            DrugSearchIndex::build_with(records, search)?,
            Icd10Index::build(entries)?,
            SynonymExpander::with_defaults_and(synonyms)?,
            IndicationMatcher::new(matcher),
        ))
    }

    /// Resolve a drug name to one label and its ranked ICD-10 codes.
    pub fn resolve(&self, drug_name: &str) -> Result<ResolvedDrug, ResolveError> {
        let _span = info_span!("resolve", query = %drug_name).entered();
        if drug_name.trim().is_empty() {
            return Err(ResolveError::EmptyInput);
        }

        let top_n = self.search.options().default_top_n.max(1);
        let candidates = self.search.search(drug_name, top_n);
        let Some(top) = candidates.first() else {
            debug!("no label above the similarity floor");
            return Err(ResolveError::NotFound {
                query: drug_name.to_string(),
            });
        };
        let record = self.select(top);
        let icd10_matches = record
            .indication_text()
            .map(|text| self.match_indication(text))
            .unwrap_or_default();
        debug!(
            source_id = %record.source_id,
            matches = icd10_matches.len(),
            "resolved label"
        );

        Ok(ResolvedDrug {
            name: record.drug_name.clone(),
            indication: record.indication.clone(),
            directions: record.directions.clone(),
            source_id: record.source_id.clone(),
            manufacturer: record.manufacturer.clone(),
            search_score: top.score,
            icd10_matches,
        })
    }

    /// Apply the selection policy to the top search candidate.
    fn select<'a>(&'a self, top: &'a SearchCandidate) -> &'a LabelRecord {
        match self.search.options().selection {
            SelectionPolicy::TopScore => &top.record,
            SelectionPolicy::MostRecent => {
                let name = self.search.normalize_query(&top.record.drug_name);
                self.search
                    .records_named(&name)
                    .into_iter()
                    .max_by(|a, b| recency(a, b))
                    .unwrap_or(&top.record)
            }
        }
    }

    pub fn search(&self, query: &str, top_n: usize) -> Vec<SearchCandidate> {
        self.search.search(query, top_n)
    }

    /// Every ingested record, in corpus order.
    pub fn list_all(&self) -> &[LabelRecord] {
        self.search.records()
    }

    /// Match free indication text without going through a label.
    pub fn match_indication(&self, text: &str) -> Vec<MatchResult> {
        self.matcher
            .match_indication(text, &self.icd10, &self.expander)
    }

    pub fn icd10(&self) -> &Icd10Index {
        &self.icd10
    }

    pub fn synonyms(&self) -> &SynonymExpander {
        &self.expander
    }
}

/// Later publication first; undated records rank below dated ones, then the
/// greater source id wins.
fn recency(a: &LabelRecord, b: &LabelRecord) -> Ordering {
    match (a.published, b.published) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.source_id.cmp(&b.source_id))
}
