//! Configuration options for the matching engine.

use serde::{Deserialize, Serialize};

/// Weights of the indication scoring function.
///
/// The base score blends the Dice overlap between phrase and description
/// with the share of the description the phrase covers. Multiplicative
/// factors then demote scattered overlaps and synonym-derived variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Weight of the Dice token overlap.
    pub overlap: f64,
    /// Weight of the description coverage (rewards longer phrases).
    pub length: f64,
    /// Factor applied when the shared tokens are not one contiguous run.
    pub scattered_factor: f64,
    /// Factor applied to variants produced by synonym expansion.
    pub synonym_factor: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            overlap: 0.6,
            length: 0.4,
            scattered_factor: 0.8,
            synonym_factor: 0.9,
        }
    }
}

/// Options for the indication matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherOptions {
    /// Maximum number of ICD-10 matches returned (K).
    pub max_results: usize,
    /// Longest phrase window, in content tokens.
    pub max_phrase_tokens: usize,
    /// Matches scoring below this are dropped. Zero scores are always dropped.
    pub min_score: f64,
    /// Best-scoring index hits kept per phrase variant.
    pub candidate_limit: usize,
    pub weights: ScoreWeights,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            max_results: 5,
            max_phrase_tokens: 4,
            min_score: 0.0,
            candidate_limit: 256,
            weights: ScoreWeights::default(),
        }
    }
}

impl MatcherOptions {
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    #[must_use]
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    #[must_use]
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }
}

/// How the reconciler picks one record among manufacturer variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Take the top-ranked search candidate.
    #[default]
    TopScore,
    /// Among the top candidate and records sharing its normalized name,
    /// take the most recently published (then the greatest source id).
    MostRecent,
}

/// Options for drug name search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Similarities below this floor count as no match.
    pub min_similarity: f64,
    /// Number of candidates returned when the caller does not ask.
    pub default_top_n: usize,
    pub selection: SelectionPolicy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            min_similarity: 0.75,
            default_top_n: 10,
            selection: SelectionPolicy::default(),
        }
    }
}

/// All tunable engine options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub matcher: MatcherOptions,
    pub search: SearchOptions,
}
