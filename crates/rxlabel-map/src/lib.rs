//! Drug name search and indication-to-ICD-10 matching.

#![deny(unsafe_code)]

pub mod icd10;
pub mod matcher;
pub mod normalize;
pub mod reconcile;
pub mod score;
pub mod search;
pub mod synonyms;

pub use icd10::{Icd10Hit, Icd10Index};
pub use matcher::IndicationMatcher;
pub use normalize::{TextNormalizer, content_tokens, normalize};
pub use reconcile::Reconciler;
pub use score::{PhraseOverlap, score_phrase};
pub use search::{DrugSearchIndex, name_similarity};
pub use synonyms::{SynonymExpander, default_synonym_entries};
