//! Scoring of an indication phrase against an ICD-10 description.
//!
//! The score blends two signals over distinct content tokens:
//!
//! - Dice overlap: `2 * overlap / (phrase + description)`
//! - description coverage: `overlap / description`
//!
//! Coverage rewards phrases that account for more of the description, so
//! "heart failure" beats "heart" against "Heart failure, unspecified". The
//! blend is then demoted when the shared tokens are scattered across the
//! description and when the phrase is a synonym variant rather than the
//! label's own wording.

use std::collections::BTreeSet;

use rxlabel_model::ScoreWeights;

/// Token overlap between one phrase variant and one description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseOverlap {
    /// Distinct tokens present in both.
    pub overlap: usize,
    /// Distinct phrase tokens.
    pub phrase_tokens: usize,
    /// Distinct description tokens.
    pub description_tokens: usize,
    /// Every phrase token is shared and the phrase occurs verbatim as a run
    /// of the description.
    pub contiguous: bool,
    pub via_synonym: bool,
}

impl PhraseOverlap {
    pub fn measure<S: AsRef<str>>(phrase: &[&str], description: &[S], via_synonym: bool) -> Self {
        let phrase_set: BTreeSet<&str> = phrase.iter().copied().collect();
        let description_set: BTreeSet<&str> = description.iter().map(|t| t.as_ref()).collect();
        let overlap = phrase_set.intersection(&description_set).count();
        let contiguous = overlap > 0
            && overlap == phrase_set.len()
            && description
                .windows(phrase.len().max(1))
                .any(|window| window.iter().map(|t| t.as_ref()).eq(phrase.iter().copied()));
        Self {
            overlap,
            phrase_tokens: phrase_set.len(),
            description_tokens: description_set.len(),
            contiguous,
            via_synonym,
        }
    }
}

/// Score a phrase/description pair. Always in `[0, 1]`; zero overlap
/// scores zero.
pub fn score_phrase(overlap: &PhraseOverlap, weights: &ScoreWeights) -> f64 {
    if overlap.overlap == 0 || overlap.description_tokens == 0 {
        return 0.0;
    }
    let shared = overlap.overlap as f64;
    let dice = 2.0 * shared / (overlap.phrase_tokens + overlap.description_tokens) as f64;
    let coverage = shared / overlap.description_tokens as f64;

    let total_weight = weights.overlap + weights.length;
    if total_weight <= 0.0 {
        return 0.0;
    }
    let mut score = (weights.overlap * dice + weights.length * coverage) / total_weight;
    if !overlap.contiguous {
        score *= weights.scattered_factor;
    }
    if overlap.via_synonym {
        score *= weights.synonym_factor;
    }
    score.clamp(0.0, 1.0)
}
