//! ICD-10 vocabulary entries.

use serde::{Deserialize, Serialize};

/// A single row of the controlled ICD-10 vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icd10Entry {
    /// Diagnosis code (e.g., "I50.9").
    pub code: String,
    /// Full description (e.g., "Heart failure, unspecified").
    pub description: String,
    /// Category title (e.g., "Heart failure").
    #[serde(default)]
    pub category: String,
}

impl Icd10Entry {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            category: category.into(),
        }
    }
}

/// Check the shape of an ICD-10 code.
///
/// Accepts a letter, two alphanumerics, and an optional extension of up to
/// four alphanumerics, either dotted (`I50.9`) or packed (`I509`).
pub fn is_valid_code(code: &str) -> bool {
    if !code.is_ascii() {
        return false;
    }
    let (head, tail) = match code.split_once('.') {
        Some((head, tail)) => {
            if tail.is_empty() {
                return false;
            }
            (head, tail)
        }
        None if code.len() > 3 => code.split_at(3),
        None => (code, ""),
    };
    let mut chars = head.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() || head.len() != 3 {
        return false;
    }
    if !chars.all(|ch| ch.is_ascii_alphanumeric()) {
        return false;
    }
    tail.len() <= 4 && tail.chars().all(|ch| ch.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dotted_and_packed_codes() {
        assert!(is_valid_code("I50.9"));
        assert!(is_valid_code("I509"));
        assert!(is_valid_code("E11"));
        assert!(is_valid_code("S72.001A"));
        assert!(is_valid_code("S72001A"));
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!(!is_valid_code(""));
        assert!(!is_valid_code("50.9"));
        assert!(!is_valid_code("I5"));
        assert!(!is_valid_code("I50."));
        assert!(!is_valid_code("I50.12345"));
        assert!(!is_valid_code("I50 9"));
    }
}
