//! Query results produced by the matching engine.
//!
//! None of these types are persisted by the engine; they are built per query
//! and handed to the serving layer.

use serde::{Deserialize, Serialize};

use crate::icd10::Icd10Entry;
use crate::label::LabelRecord;

/// An ICD-10 entry matched against indication text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub entry: Icd10Entry,
    /// Similarity in `[0, 1]`; higher means stronger textual overlap.
    pub score: f64,
    /// Normalized phrase (or synonym variant) that hit the index.
    pub matched_on: String,
    /// Indication phrase the variant was derived from.
    pub phrase: String,
    /// True when `matched_on` came from synonym expansion of `phrase`.
    pub via_synonym: bool,
}

impl MatchResult {
    pub fn code(&self) -> &str {
        &self.entry.code
    }
}

/// A label record returned by the drug name search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub record: LabelRecord,
    /// Name similarity in `[0, 1]`.
    pub score: f64,
}

/// The consolidated answer for a drug name query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDrug {
    pub name: String,
    pub indication: Option<String>,
    pub directions: Option<String>,
    pub source_id: String,
    pub manufacturer: Option<String>,
    /// Similarity of the selected record's name to the query.
    pub search_score: f64,
    pub icd10_matches: Vec<MatchResult>,
}

impl ResolvedDrug {
    /// Best-scoring ICD-10 match, if any.
    pub fn top_match(&self) -> Option<&MatchResult> {
        self.icd10_matches.first()
    }
}
