//! Label text normalization.
//!
//! Every string that takes part in matching (indication text, ICD-10
//! descriptions, synonym terms, drug names) goes through [`TextNormalizer`]
//! first, so all comparisons happen on the same canonical form:
//!
//! - lower-cased
//! - punctuation replaced by separators, except hyphens joining two
//!   alphanumerics (`beta-blocker`, `gastro-esophageal`)
//! - whitespace collapsed to single spaces
//! - medical abbreviations expanded token by token (`htn` -> `hypertension`)
//!
//! Normalization is idempotent as long as no abbreviation expansion contains
//! another abbreviation, which holds for the built-in table.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use rxlabel_model::NormalizedText;

/// Built-in abbreviation table (abbreviation, expansion).
const DEFAULT_ABBREVIATIONS: &[(&str, &str)] = &[
    ("adhd", "attention-deficit hyperactivity disorder"),
    ("afib", "atrial fibrillation"),
    ("bp", "blood pressure"),
    ("bph", "benign prostatic hyperplasia"),
    ("cad", "coronary artery disease"),
    ("chf", "congestive heart failure"),
    ("ckd", "chronic kidney disease"),
    ("copd", "chronic obstructive pulmonary disease"),
    ("dm", "diabetes mellitus"),
    ("dvt", "deep vein thrombosis"),
    ("gerd", "gastro-esophageal reflux disease"),
    ("hf", "heart failure"),
    ("htn", "hypertension"),
    ("ibs", "irritable bowel syndrome"),
    ("mi", "myocardial infarction"),
    ("t1dm", "type 1 diabetes mellitus"),
    ("t2dm", "type 2 diabetes mellitus"),
    ("tia", "transient ischemic attack"),
    ("uri", "upper respiratory infection"),
    ("uti", "urinary tract infection"),
];

static DEFAULT_NORMALIZER: LazyLock<TextNormalizer> = LazyLock::new(TextNormalizer::new);

/// Normalize text with the built-in abbreviation table.
pub fn normalize(text: &str) -> NormalizedText {
    DEFAULT_NORMALIZER.normalize(text)
}

/// Canonicalizes raw label text before any matching.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    abbreviations: BTreeMap<String, Vec<String>>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    /// Create a normalizer with the built-in abbreviation table.
    pub fn new() -> Self {
        let mut normalizer = Self::without_abbreviations();
        for (abbreviation, expansion) in DEFAULT_ABBREVIATIONS {
            normalizer = normalizer.with_abbreviation(abbreviation, expansion);
        }
        normalizer
    }

    /// Create a normalizer that expands nothing.
    pub fn without_abbreviations() -> Self {
        Self {
            abbreviations: BTreeMap::new(),
        }
    }

    /// Add (or replace) an abbreviation.
    ///
    /// Both sides are cleaned first. The expansion must not itself contain
    /// an abbreviation, otherwise normalization stops being idempotent.
    /// Abbreviations that clean to more than one token are ignored because
    /// expansion works token by token.
    #[must_use]
    pub fn with_abbreviation(mut self, abbreviation: &str, expansion: &str) -> Self {
        let key = clean(abbreviation);
        if key.is_empty() || key.contains(' ') {
            return self;
        }
        let tokens: Vec<String> = clean(expansion)
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if tokens.is_empty() {
            return self;
        }
        self.abbreviations.insert(key, tokens);
        self
    }

    /// Expansion for a single abbreviation token, if known.
    pub fn expansion(&self, token: &str) -> Option<String> {
        self.abbreviations.get(token).map(|tokens| tokens.join(" "))
    }

    /// Normalize raw text. Never fails; empty input gives empty output.
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let cleaned = clean(text);
        let mut out: Vec<&str> = Vec::new();
        for token in cleaned.split_whitespace() {
            match self.abbreviations.get(token) {
                Some(expansion) => out.extend(expansion.iter().map(String::as_str)),
                None => out.push(token),
            }
        }
        NormalizedText::from_normalized(out.join(" "))
    }
}

/// Lower-case and replace everything but alphanumerics and joining hyphens
/// with spaces, then collapse whitespace.
fn clean(text: &str) -> String {
    let lower = text.to_lowercase();
    let chars: Vec<char> = lower.chars().collect();
    let mut out = String::with_capacity(lower.len());
    for (idx, &ch) in chars.iter().enumerate() {
        if ch.is_alphanumeric() {
            out.push(ch);
        } else if ch == '-' && is_joining_hyphen(&chars, idx) {
            out.push('-');
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_joining_hyphen(chars: &[char], idx: usize) -> bool {
    let before = idx
        .checked_sub(1)
        .and_then(|prev| chars.get(prev))
        .is_some_and(|ch| ch.is_alphanumeric());
    let after = chars.get(idx + 1).is_some_and(|ch| ch.is_alphanumeric());
    before && after
}

/// Content tokens of normalized text: stopwords and label boilerplate
/// removed, order kept.
pub fn content_tokens(text: &NormalizedText) -> Vec<&str> {
    text.tokens().filter(|token| is_content_token(token)).collect()
}

/// Whether a normalized token carries clinical meaning for matching.
pub fn is_content_token(token: &str) -> bool {
    !is_stopword(token) && !is_label_boilerplate(token)
}

fn is_stopword(token: &str) -> bool {
    matches!(
        token,
        "a" | "an"
            | "and"
            | "are"
            | "as"
            | "at"
            | "be"
            | "by"
            | "for"
            | "from"
            | "in"
            | "into"
            | "is"
            | "it"
            | "its"
            | "of"
            | "on"
            | "or"
            | "such"
            | "than"
            | "that"
            | "the"
            | "their"
            | "this"
            | "to"
            | "was"
            | "were"
            | "which"
            | "who"
            | "with"
    )
}

/// Words that appear in almost every "Indications and Usage" section.
fn is_label_boilerplate(token: &str) -> bool {
    matches!(
        token,
        "indicated"
            | "indication"
            | "indications"
            | "usage"
            | "use"
            | "used"
            | "treatment"
            | "treat"
            | "treating"
            | "management"
            | "therapy"
            | "patient"
            | "patients"
            | "adult"
            | "adults"
            | "including"
            | "temporarily"
            | "temporary"
            | "relief"
            | "relieves"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(
            normalize("Carvedilol  PHOSPHATE!").as_str(),
            "carvedilol phosphate"
        );
        assert_eq!(
            normalize("Heart failure, unspecified").as_str(),
            "heart failure unspecified"
        );
    }

    #[test]
    fn keeps_joining_hyphens_only() {
        assert_eq!(normalize("beta-blocker").as_str(), "beta-blocker");
        assert_eq!(normalize("- leading -- double-").as_str(), "leading double");
        assert_eq!(normalize("a--b").as_str(), "a b");
    }

    #[test]
    fn expands_abbreviations_as_whole_tokens() {
        assert_eq!(normalize("HTN").as_str(), "hypertension");
        assert_eq!(
            normalize("patients with CHF.").as_str(),
            "patients with congestive heart failure"
        );
        // Only whole tokens expand.
        assert_eq!(normalize("htnx").as_str(), "htnx");
    }

    #[test]
    fn empty_and_punctuation_only_input() {
        assert!(normalize("").is_empty());
        assert!(normalize("  !!! ... ").is_empty());
    }

    #[test]
    fn builtin_expansions_contain_no_abbreviations() {
        let normalizer = TextNormalizer::new();
        for (_, expansion) in DEFAULT_ABBREVIATIONS {
            for token in clean(expansion).split_whitespace() {
                assert!(
                    normalizer.expansion(token).is_none(),
                    "expansion {expansion:?} contains abbreviation {token:?}"
                );
            }
        }
    }

    #[test]
    fn custom_abbreviation() {
        let normalizer =
            TextNormalizer::without_abbreviations().with_abbreviation("OA", "osteoarthritis");
        assert_eq!(normalizer.normalize("Knee OA").as_str(), "knee osteoarthritis");
        assert_eq!(normalizer.normalize("HTN").as_str(), "htn");
    }

    #[test]
    fn multi_token_abbreviation_is_ignored() {
        let normalizer =
            TextNormalizer::without_abbreviations().with_abbreviation("n v", "nausea");
        assert_eq!(normalizer.expansion("n"), None);
        assert_eq!(normalizer.normalize("n v").as_str(), "n v");
    }

    #[test]
    fn content_tokens_drop_stopwords_and_boilerplate() {
        let text = normalize("Indicated for the treatment of heart failure in adults");
        assert_eq!(content_tokens(&text), vec!["heart", "failure"]);
    }

    #[test]
    fn normalized_rendering() {
        let text = normalize("GERD / heartburn (adult use)");
        insta::assert_snapshot!(text.as_str(), @"gastro-esophageal reflux disease heartburn adult use");
    }
}
