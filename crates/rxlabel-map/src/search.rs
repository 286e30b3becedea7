//! Fuzzy drug name search over the label corpus.
//!
//! Uses Jaro-Winkler similarity on the normalized names, both on the whole
//! string and token by token, so "metoprolol tartrate" still finds
//! "Metoprolol Tartrate Extended Release".

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rapidfuzz::distance::jaro_winkler;
use rxlabel_model::{IndexError, LabelRecord, NormalizedText, SearchCandidate, SearchOptions};
use tracing::{debug, info};

use crate::normalize::TextNormalizer;

/// Token-level matches never reach a perfect score; only an identical name
/// does.
const TOKEN_SCORE_CAP: f64 = 0.98;

/// Similarity between two normalized drug names in `[0, 1]`.
///
/// Identical names score 1.0. Otherwise the score is the larger of the
/// whole-string Jaro-Winkler similarity and the capped token score (best
/// per-token similarity, summed over query tokens, divided by the larger
/// token count).
pub fn name_similarity(query: &NormalizedText, name: &NormalizedText) -> f64 {
    if query.is_empty() || name.is_empty() {
        return 0.0;
    }
    if query == name {
        return 1.0;
    }
    let whole = jaro_winkler::similarity(query.as_str().chars(), name.as_str().chars());

    let name_tokens: Vec<&str> = name.tokens().collect();
    let mut token_total = 0.0;
    let mut query_count = 0usize;
    for query_token in query.tokens() {
        query_count += 1;
        token_total += name_tokens
            .iter()
            .map(|name_token| jaro_winkler::similarity(query_token.chars(), name_token.chars()))
            .fold(0.0_f64, f64::max);
    }
    let denominator = query_count.max(name_tokens.len()) as f64;
    let token_score = token_total / denominator * TOKEN_SCORE_CAP;

    whole.max(token_score).clamp(0.0, 1.0)
}

/// Search index over label records, keyed by normalized drug name.
///
/// Manufacturer variants of the same drug are independent records.
#[derive(Debug, Clone)]
pub struct DrugSearchIndex {
    records: Vec<LabelRecord>,
    names: Vec<NormalizedText>,
    by_name: BTreeMap<NormalizedText, Vec<usize>>,
    normalizer: TextNormalizer,
    options: SearchOptions,
}

impl DrugSearchIndex {
    pub fn build(records: Vec<LabelRecord>) -> Result<Self, IndexError> {
        Self::build_with(records, SearchOptions::default())
    }

    /// Index records, rejecting any whose drug name normalizes to nothing.
    pub fn build_with(
        records: Vec<LabelRecord>,
        options: SearchOptions,
    ) -> Result<Self, IndexError> {
        // Drug names are not clinical text; abbreviation expansion would
        // turn a product called "HF" into "heart failure".
        let normalizer = TextNormalizer::without_abbreviations();
        let mut names = Vec::with_capacity(records.len());
        let mut by_name: BTreeMap<NormalizedText, Vec<usize>> = BTreeMap::new();
        for (position, record) in records.iter().enumerate() {
            let name = normalizer.normalize(&record.drug_name);
            if name.is_empty() {
                return Err(IndexError::MissingDrugName {
                    position,
                    source_id: record.source_id.clone(),
                });
            }
            by_name.entry(name.clone()).or_default().push(position);
            names.push(name);
        }
        info!(
            records = records.len(),
            names = by_name.len(),
            "built drug search index"
        );
        Ok(Self {
            records,
            names,
            by_name,
            normalizer,
            options,
        })
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Normalize a query the same way drug names are normalized.
    pub fn normalize_query(&self, query: &str) -> NormalizedText {
        self.normalizer.normalize(query)
    }

    /// Up to `top_n` records whose name is similar to `query`.
    ///
    /// Ordered by descending similarity, then shorter name, then name, then
    /// source id. Similarities below the configured floor are dropped.
    pub fn search(&self, query: &str, top_n: usize) -> Vec<SearchCandidate> {
        let query = self.normalizer.normalize(query);
        if query.is_empty() || top_n == 0 || self.records.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f64)> = self
            .names
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| {
                let score = name_similarity(&query, name);
                (score > 0.0 && score >= self.options.min_similarity).then_some((idx, score))
            })
            .collect();
        scored.sort_by(|&(a, score_a), &(b, score_b)| {
            score_b
                .total_cmp(&score_a)
                .then_with(|| self.tie_break(a, b))
        });
        scored.truncate(top_n);

        debug!(query = %query, candidates = scored.len(), "searched drug names");
        scored
            .into_iter()
            .map(|(idx, score)| SearchCandidate {
                record: self.records[idx].clone(),
                score,
            })
            .collect()
    }

    fn tie_break(&self, a: usize, b: usize) -> Ordering {
        let (name_a, name_b) = (&self.names[a], &self.names[b]);
        name_a
            .as_str()
            .chars()
            .count()
            .cmp(&name_b.as_str().chars().count())
            .then_with(|| name_a.cmp(name_b))
            .then_with(|| self.records[a].source_id.cmp(&self.records[b].source_id))
    }

    /// Records whose normalized drug name equals `name`, in corpus order.
    pub fn records_named(&self, name: &NormalizedText) -> Vec<&LabelRecord> {
        self.by_name
            .get(name)
            .map(|positions| positions.iter().map(|&idx| &self.records[idx]).collect())
            .unwrap_or_default()
    }

    /// Every record in corpus order.
    pub fn records(&self) -> &[LabelRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
