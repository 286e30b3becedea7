//! Drug label records and the synonym dictionary entries.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One ingested drug label.
///
/// A drug name may appear on several records (one per manufacturer or label
/// set); records are identified by `drug_name` + `source_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    /// Drug name as printed on the label (e.g., "Carvedilol").
    pub drug_name: String,

    /// Free-text "Indications and Usage" content.
    #[serde(default)]
    pub indication: Option<String>,

    /// Free-text "Dosage and Administration" content.
    #[serde(default)]
    pub directions: Option<String>,

    /// Opaque label identifier (e.g., an SPL set id).
    #[serde(default)]
    pub source_id: String,

    #[serde(default)]
    pub manufacturer: Option<String>,

    /// Effective date of this label version, when known.
    #[serde(default)]
    pub published: Option<NaiveDate>,
}

impl LabelRecord {
    pub fn new(drug_name: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            drug_name: drug_name.into(),
            indication: None,
            directions: None,
            source_id: source_id.into(),
            manufacturer: None,
            published: None,
        }
    }

    #[must_use]
    pub fn with_indication(mut self, indication: impl Into<String>) -> Self {
        self.indication = Some(indication.into());
        self
    }

    #[must_use]
    pub fn with_directions(mut self, directions: impl Into<String>) -> Self {
        self.directions = Some(directions.into());
        self
    }

    #[must_use]
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn with_published(mut self, published: NaiveDate) -> Self {
        self.published = Some(published);
        self
    }

    /// Indication text, or `None` when missing or blank.
    pub fn indication_text(&self) -> Option<&str> {
        self.indication
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// A canonical clinical term and its known alternate phrasings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub canonical: String,
    pub synonyms: BTreeSet<String>,
}

impl SynonymEntry {
    pub fn new<I, S>(canonical: impl Into<String>, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            canonical: canonical.into(),
            synonyms: synonyms.into_iter().map(Into::into).collect(),
        }
    }
}
