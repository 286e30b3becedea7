//! Single-hop clinical synonym expansion.
//!
//! The dictionary is hand-curated and far from exhaustive. Expansion follows
//! exactly one edge: a canonical term yields its synonyms, a synonym yields
//! its canonical term(s). Siblings (other synonyms of the same canonical
//! term) and synonyms of synonyms are never reached.

use std::collections::{BTreeMap, BTreeSet};

use rxlabel_model::{IndexError, NormalizedText, SynonymEntry};
use tracing::debug;

use crate::normalize::{TextNormalizer, content_tokens};

/// Curated clinical synonyms carried by default.
const DEFAULT_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "hypertension",
        &[
            "high blood pressure",
            "elevated blood pressure",
            "elevated blood-pressure",
            "blood pressure high",
            "elevated bp",
            "increased blood pressure",
        ],
    ),
    (
        "diabetes",
        &[
            "diabetes mellitus",
            "type 2 diabetes",
            "type 1 diabetes",
            "diabetes mellitus type 2",
            "diabetes mellitus type 1",
            "diabetic",
        ],
    ),
    (
        "headache",
        &[
            "cephalalgia",
            "cephalgia",
            "head pain",
            "migraine",
            "head ache",
            "cranial pain",
        ],
    ),
    (
        "fever",
        &[
            "pyrexia",
            "febrile",
            "hyperthermia",
            "elevated temperature",
            "high temperature",
        ],
    ),
    (
        "nausea",
        &[
            "queasiness",
            "sick to stomach",
            "upset stomach",
            "stomach upset",
            "nauseous",
            "nauseated",
        ],
    ),
    (
        "vomiting",
        &["emesis", "throwing up", "vomitus", "regurgitation", "n/v"],
    ),
    (
        "fatigue",
        &[
            "tiredness",
            "exhaustion",
            "weariness",
            "lethargy",
            "lack of energy",
            "low energy",
        ],
    ),
    (
        "pain",
        &["ache", "discomfort", "soreness", "tenderness", "painful"],
    ),
    ("swelling", &["edema", "swollen", "puffiness"]),
    (
        "infection",
        &[
            "bacterial infection",
            "viral infection",
            "fungal infection",
            "infectious disease",
            "sepsis",
        ],
    ),
];

/// The curated default dictionary as synonym entries.
pub fn default_synonym_entries() -> Vec<SynonymEntry> {
    DEFAULT_SYNONYMS
        .iter()
        .map(|(canonical, synonyms)| SynonymEntry::new(*canonical, synonyms.iter().copied()))
        .collect()
}

/// Expands a normalized clinical term into its known alternate phrasings.
///
/// Terms are keyed by their content tokens, so "sick to stomach" and the
/// phrase window "sick stomach" find the same group.
#[derive(Debug, Clone, Default)]
pub struct SynonymExpander {
    groups: BTreeMap<String, BTreeSet<NormalizedText>>,
}

impl SynonymExpander {
    /// Build from synonym entries, normalizing every term.
    ///
    /// Fails if a canonical term normalizes to nothing. Empty synonyms are
    /// dropped, as are synonyms identical to their canonical term.
    pub fn build(entries: &[SynonymEntry]) -> Result<Self, IndexError> {
        Self::build_with(entries, &TextNormalizer::new())
    }

    pub fn build_with(
        entries: &[SynonymEntry],
        normalizer: &TextNormalizer,
    ) -> Result<Self, IndexError> {
        let mut groups: BTreeMap<String, BTreeSet<NormalizedText>> = BTreeMap::new();
        for entry in entries {
            let canonical = normalizer.normalize(&entry.canonical);
            if canonical.is_empty() {
                return Err(IndexError::EmptySynonymTerm);
            }
            let canonical_key = lookup_key(&canonical);
            for raw in &entry.synonyms {
                let synonym = normalizer.normalize(raw);
                if synonym.is_empty() || lookup_key(&synonym) == canonical_key {
                    continue;
                }
                groups
                    .entry(lookup_key(&synonym))
                    .or_default()
                    .insert(canonical.clone());
                groups
                    .entry(canonical_key.clone())
                    .or_default()
                    .insert(synonym);
            }
        }
        debug!(terms = groups.len(), "built synonym expander");
        Ok(Self { groups })
    }

    /// The curated default dictionary.
    pub fn with_defaults() -> Self {
        // Built-in terms are non-empty, so this cannot fail.
        Self::with_defaults_and(&[]).unwrap_or_default()
    }

    /// The curated default dictionary extended with `extra` entries.
    ///
    /// Extra entries are merged term by term; they never remove defaults.
    pub fn with_defaults_and(extra: &[SynonymEntry]) -> Result<Self, IndexError> {
        let mut entries = default_synonym_entries();
        entries.extend_from_slice(extra);
        Self::build(&entries)
    }

    /// Expand a term. The result always contains the term itself.
    pub fn expand(&self, term: &NormalizedText) -> BTreeSet<NormalizedText> {
        let mut expanded = BTreeSet::new();
        expanded.insert(term.clone());
        if let Some(group) = self.groups.get(&lookup_key(term)) {
            expanded.extend(group.iter().cloned());
        }
        expanded
    }

    /// Number of distinct terms that expand to something beyond themselves.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn lookup_key(term: &NormalizedText) -> String {
    let tokens = content_tokens(term);
    if tokens.is_empty() {
        term.as_str().to_string()
    } else {
        tokens.join(" ")
    }
}
