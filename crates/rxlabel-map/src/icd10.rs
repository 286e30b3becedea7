//! Inverted index over the ICD-10 vocabulary.

use std::collections::{BTreeMap, BTreeSet};

use rxlabel_model::icd10::is_valid_code;
use rxlabel_model::{Icd10Entry, IndexError, NormalizedText};
use tracing::info;

use crate::normalize::{TextNormalizer, content_tokens};

/// An index entry sharing tokens with a query term.
#[derive(Debug, Clone, Copy)]
pub struct Icd10Hit<'a> {
    pub entry: &'a Icd10Entry,
    /// Number of distinct content tokens shared with the term.
    pub shared: usize,
    /// Content tokens of the normalized description, in order.
    pub description_tokens: &'a [String],
}

/// Immutable token index over ICD-10 descriptions, built once at startup.
#[derive(Debug, Clone)]
pub struct Icd10Index {
    /// Sorted by code, so entry position order is code order.
    entries: Vec<Icd10Entry>,
    description_tokens: Vec<Vec<String>>,
    postings: BTreeMap<String, Vec<usize>>,
    by_code: BTreeMap<String, usize>,
    normalizer: TextNormalizer,
}

impl Icd10Index {
    /// Validate and index a table with the default normalizer.
    pub fn build(entries: Vec<Icd10Entry>) -> Result<Self, IndexError> {
        Self::build_with(entries, &TextNormalizer::new())
    }

    /// Validate and index a table.
    ///
    /// Any malformed entry fails the build; nothing is skipped.
    pub fn build_with(
        entries: Vec<Icd10Entry>,
        normalizer: &TextNormalizer,
    ) -> Result<Self, IndexError> {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut cleaned = Vec::with_capacity(entries.len());
        for (position, entry) in entries.into_iter().enumerate() {
            let code = entry.code.trim().to_string();
            if code.is_empty() {
                return Err(IndexError::MissingCode { position });
            }
            if !is_valid_code(&code) {
                return Err(IndexError::InvalidCode { code });
            }
            if !seen.insert(code.to_uppercase()) {
                return Err(IndexError::DuplicateCode { code });
            }
            let description = entry.description.trim().to_string();
            if description.is_empty() {
                return Err(IndexError::MissingDescription { code });
            }
            cleaned.push(Icd10Entry {
                code,
                description,
                category: entry.category.trim().to_string(),
            });
        }
        cleaned.sort_by(|a, b| a.code.cmp(&b.code));

        let mut description_tokens = Vec::with_capacity(cleaned.len());
        let mut postings: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut by_code = BTreeMap::new();
        for (idx, entry) in cleaned.iter().enumerate() {
            let normalized = normalizer.normalize(&entry.description);
            let tokens: Vec<String> = content_tokens(&normalized)
                .into_iter()
                .map(str::to_string)
                .collect();
            let distinct: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
            for token in distinct {
                postings.entry(token.to_string()).or_default().push(idx);
            }
            description_tokens.push(tokens);
            by_code.insert(entry.code.to_uppercase(), idx);
        }

        info!(
            entries = cleaned.len(),
            tokens = postings.len(),
            "built ICD-10 index"
        );
        Ok(Self {
            entries: cleaned,
            description_tokens,
            postings,
            by_code,
            normalizer: normalizer.clone(),
        })
    }

    /// Entries sharing at least one content token with an already
    /// normalized term, most shared tokens first, ties by code.
    pub fn hits(&self, term: &NormalizedText) -> Vec<Icd10Hit<'_>> {
        let tokens: BTreeSet<&str> = content_tokens(term).into_iter().collect();
        let mut shared: BTreeMap<usize, usize> = BTreeMap::new();
        for token in tokens {
            if let Some(posting) = self.postings.get(token) {
                for &idx in posting {
                    *shared.entry(idx).or_insert(0) += 1;
                }
            }
        }
        let mut hits: Vec<Icd10Hit<'_>> = shared
            .into_iter()
            .map(|(idx, count)| Icd10Hit {
                entry: &self.entries[idx],
                shared: count,
                description_tokens: &self.description_tokens[idx],
            })
            .collect();
        // Positions follow code order, so a stable sort keeps ties by code.
        hits.sort_by(|a, b| b.shared.cmp(&a.shared));
        hits
    }

    /// Entries whose description shares a content token with `term`.
    pub fn candidates(&self, term: &str) -> Vec<&Icd10Entry> {
        let normalized = self.normalizer.normalize(term);
        self.hits(&normalized)
            .into_iter()
            .map(|hit| hit.entry)
            .collect()
    }

    /// Look up an entry by code, ignoring case.
    pub fn get(&self, code: &str) -> Option<&Icd10Entry> {
        self.by_code
            .get(&code.trim().to_uppercase())
            .map(|&idx| &self.entries[idx])
    }

    /// All entries ordered by code.
    pub fn entries(&self) -> &[Icd10Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, description: &str) -> Icd10Entry {
        Icd10Entry::new(code, description, "")
    }

    fn sample() -> Icd10Index {
        Icd10Index::build(vec![
            entry("I50.9", "Heart failure, unspecified"),
            entry("I10", "Essential (primary) hypertension"),
            entry("I11.0", "Hypertensive heart disease with heart failure"),
            entry("I25.10", "Atherosclerotic heart disease of native coronary artery"),
        ])
        .unwrap()
    }

    #[test]
    fn candidates_order_by_shared_tokens_then_code() {
        let index = sample();
        let codes: Vec<&str> = index
            .candidates("heart failure")
            .iter()
            .map(|e| e.code.as_str())
            .collect();
        assert_eq!(codes, vec!["I11.0", "I50.9", "I25.10"]);
    }

    #[test]
    fn candidates_for_empty_or_stopword_term() {
        let index = sample();
        assert!(index.candidates("").is_empty());
        assert!(index.candidates("of the").is_empty());
    }

    #[test]
    fn description_tokens_skip_stopwords() {
        let index = sample();
        let hits = index.hits(&crate::normalize::normalize("coronary"));
        assert_eq!(hits.len(), 1);
        assert_eq!(
            hits[0].description_tokens,
            ["atherosclerotic", "heart", "disease", "native", "coronary", "artery"]
        );
    }

    #[test]
    fn get_is_case_insensitive() {
        let index = sample();
        assert_eq!(
            index.get("i50.9").map(|e| e.description.as_str()),
            Some("Heart failure, unspecified")
        );
        assert!(index.get("Z99").is_none());
        assert_eq!(index.len(), 4);
        assert_eq!(index.entries()[0].code, "I10");
    }

    #[test]
    fn rejects_malformed_tables() {
        let missing = Icd10Index::build(vec![entry("I10", "x"), entry("  ", "y")]);
        assert_eq!(
            missing.unwrap_err(),
            IndexError::MissingCode { position: 1 }
        );

        let invalid = Icd10Index::build(vec![entry("150.9", "Heart failure")]);
        assert_eq!(
            invalid.unwrap_err(),
            IndexError::InvalidCode {
                code: "150.9".to_string()
            }
        );

        let duplicate = Icd10Index::build(vec![entry("I10", "a"), entry("i10", "b")]);
        assert_eq!(
            duplicate.unwrap_err(),
            IndexError::DuplicateCode {
                code: "i10".to_string()
            }
        );

        let blank = Icd10Index::build(vec![entry("I10", "  ")]);
        assert_eq!(
            blank.unwrap_err(),
            IndexError::MissingDescription {
                code: "I10".to_string()
            }
        );
    }

    #[test]
    fn empty_table_is_allowed() {
        let index = Icd10Index::build(Vec::new()).unwrap();
        assert!(index.is_empty());
        assert!(index.candidates("heart").is_empty());
    }
}
