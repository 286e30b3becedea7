//! Indication text to ICD-10 matching.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use rxlabel_model::{Icd10Entry, MatchResult, MatcherOptions, NormalizedText};
use tracing::debug;

use crate::icd10::Icd10Index;
use crate::normalize::{TextNormalizer, content_tokens};
use crate::score::{PhraseOverlap, score_phrase};
use crate::synonyms::SynonymExpander;

/// Matches free indication text against the ICD-10 index.
///
/// The text is cut into phrase windows of content tokens, each window is
/// expanded through the synonym table, and every variant is scored against
/// the index hits it produces. Each code keeps its best-scoring variant.
/// A synonym variant is capped below the phrase's own contiguous match on
/// the same code.
#[derive(Debug, Clone, Default)]
pub struct IndicationMatcher {
    normalizer: TextNormalizer,
    options: MatcherOptions,
}

impl IndicationMatcher {
    pub fn new(options: MatcherOptions) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            options,
        }
    }

    #[must_use]
    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn options(&self) -> &MatcherOptions {
        &self.options
    }

    /// Rank ICD-10 codes for an indication.
    ///
    /// At most `max_results` matches, by descending score and then by
    /// ascending code. Empty text gives an empty result.
    pub fn match_indication(
        &self,
        indication: &str,
        index: &Icd10Index,
        expander: &SynonymExpander,
    ) -> Vec<MatchResult> {
        let normalized = self.normalizer.normalize(indication);
        let tokens = content_tokens(&normalized);
        if tokens.is_empty() || self.options.max_results == 0 {
            return Vec::new();
        }

        let phrases = phrase_windows(&tokens, self.options.max_phrase_tokens);
        let mut best: BTreeMap<String, MatchResult> = BTreeMap::new();
        let mut scored = 0usize;
        for phrase in &phrases {
            let mut direct = self.scored_hits(phrase, false, index);
            scored += direct.len();
            let ceilings = contiguous_scores(&direct);
            self.keep_best(&mut direct);
            self.offer(&mut best, phrase, phrase, direct);

            let synonym_factor = self.options.weights.synonym_factor.min(1.0);
            for variant in expander.expand(phrase) {
                if variant == *phrase {
                    continue;
                }
                let mut hits = self.scored_hits(&variant, true, index);
                scored += hits.len();
                // The label's own contiguous wording stays ahead of every
                // synonym of the same phrase on the same code.
                for hit in &mut hits {
                    if let Some(&ceiling) = ceilings.get(hit.entry.code.as_str()) {
                        hit.score = hit.score.min(ceiling * synonym_factor);
                    }
                }
                hits.retain(|hit| hit.score > 0.0);
                self.keep_best(&mut hits);
                self.offer(&mut best, phrase, &variant, hits);
            }
        }

        let mut results: Vec<MatchResult> = best.into_values().collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.code().cmp(b.code())));
        results.truncate(self.options.max_results);
        debug!(
            phrases = phrases.len(),
            scored,
            matches = results.len(),
            "matched indication"
        );
        results
    }

    /// Score every index hit of one variant. Zero scores are dropped.
    fn scored_hits<'a>(
        &self,
        variant: &NormalizedText,
        via_synonym: bool,
        index: &'a Icd10Index,
    ) -> Vec<ScoredHit<'a>> {
        let variant_tokens = content_tokens(variant);
        if variant_tokens.is_empty() {
            return Vec::new();
        }
        index
            .hits(variant)
            .into_iter()
            .filter_map(|hit| {
                let overlap =
                    PhraseOverlap::measure(&variant_tokens, hit.description_tokens, via_synonym);
                let score = score_phrase(&overlap, &self.options.weights);
                (score > 0.0).then_some(ScoredHit {
                    entry: hit.entry,
                    score,
                    contiguous: overlap.contiguous,
                    via_synonym,
                })
            })
            .collect()
    }

    /// Keep the `candidate_limit` best hits, by score and then code.
    fn keep_best(&self, hits: &mut Vec<ScoredHit<'_>>) {
        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.entry.code.cmp(&b.entry.code))
        });
        hits.truncate(self.options.candidate_limit);
    }

    /// Merge a variant's hits into the best match per code.
    fn offer(
        &self,
        best: &mut BTreeMap<String, MatchResult>,
        phrase: &NormalizedText,
        variant: &NormalizedText,
        hits: Vec<ScoredHit<'_>>,
    ) {
        for hit in hits {
            if hit.score < self.options.min_score {
                continue;
            }
            let candidate = MatchResult {
                entry: hit.entry.clone(),
                score: hit.score,
                matched_on: variant.as_str().to_string(),
                phrase: phrase.as_str().to_string(),
                via_synonym: hit.via_synonym,
            };
            let replace = best
                .get(&hit.entry.code)
                .is_none_or(|current| outranks(&candidate, current));
            if replace {
                best.insert(hit.entry.code.clone(), candidate);
            }
        }
    }
}

/// One index entry scored against one phrase variant.
#[derive(Debug, Clone, Copy)]
struct ScoredHit<'a> {
    entry: &'a Icd10Entry,
    score: f64,
    contiguous: bool,
    via_synonym: bool,
}

/// Score of each code the phrase matched as a contiguous run.
fn contiguous_scores<'a>(hits: &[ScoredHit<'a>]) -> BTreeMap<&'a str, f64> {
    hits.iter()
        .filter(|hit| hit.contiguous)
        .map(|hit| {
            let entry: &'a Icd10Entry = hit.entry;
            (entry.code.as_str(), hit.score)
        })
        .collect()
}

/// Every run of 1..=`max_len` consecutive tokens, deduplicated.
fn phrase_windows(tokens: &[&str], max_len: usize) -> BTreeSet<NormalizedText> {
    let mut phrases = BTreeSet::new();
    for len in 1..=max_len.min(tokens.len()) {
        for window in tokens.windows(len) {
            phrases.insert(NormalizedText::from_normalized(window.join(" ")));
        }
    }
    phrases
}

/// Whether `candidate` should replace `current` as the match for a code.
///
/// Higher score wins; on equal scores the label's own wording beats a
/// synonym, then the longer phrase, then the lexically smaller variant.
fn outranks(candidate: &MatchResult, current: &MatchResult) -> bool {
    let order = candidate
        .score
        .total_cmp(&current.score)
        .then_with(|| current.via_synonym.cmp(&candidate.via_synonym))
        .then_with(|| token_len(&candidate.phrase).cmp(&token_len(&current.phrase)))
        .then_with(|| current.matched_on.cmp(&candidate.matched_on));
    order == Ordering::Greater
}

fn token_len(text: &str) -> usize {
    text.split(' ').filter(|token| !token.is_empty()).count()
}
