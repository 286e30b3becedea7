#![deny(unsafe_code)]

pub mod error;
pub mod icd10;
pub mod label;
pub mod matching;
pub mod options;
pub mod text;

pub use error::{IndexError, ResolveError};
pub use icd10::Icd10Entry;
pub use label::{LabelRecord, SynonymEntry};
pub use matching::{MatchResult, ResolvedDrug, SearchCandidate};
pub use options::{EngineOptions, MatcherOptions, ScoreWeights, SearchOptions, SelectionPolicy};
pub use text::NormalizedText;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_drug_serializes() {
        let resolved = ResolvedDrug {
            name: "Carvedilol".to_string(),
            indication: Some("treatment of heart failure".to_string()),
            directions: None,
            source_id: "set-1".to_string(),
            manufacturer: None,
            search_score: 1.0,
            icd10_matches: vec![],
        };
        let json = serde_json::to_string(&resolved).expect("serialize resolved drug");
        let round: ResolvedDrug = serde_json::from_str(&json).expect("deserialize resolved drug");
        assert_eq!(round.name, "Carvedilol");
        assert_eq!(round.source_id, "set-1");
    }
}
