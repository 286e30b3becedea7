use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::dataset::{DataFile, Dataset};

/// Summary of what the engine would load, for `rxlabel doctor`.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub schema: String,
    pub schema_version: u32,
    pub config: Option<PathBuf>,
    pub files: Vec<DataFile>,
    pub counts: DoctorCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorCounts {
    pub labels: usize,
    pub labels_with_indication: usize,
    pub distinct_drug_names: usize,
    pub icd10_entries: usize,
    pub synonym_entries: usize,
}

impl DoctorReport {
    pub fn from_dataset(config: Option<PathBuf>, dataset: &Dataset) -> Self {
        let distinct_drug_names = dataset
            .labels
            .iter()
            .map(|record| record.drug_name.trim().to_lowercase())
            .collect::<BTreeSet<_>>()
            .len();
        let mut files = dataset.files.clone();
        files.sort_by(|a, b| a.role.cmp(&b.role).then_with(|| a.path.cmp(&b.path)));
        Self {
            schema: "rxlabel.doctor".to_string(),
            schema_version: 1,
            config,
            files,
            counts: DoctorCounts {
                labels: dataset.labels.len(),
                labels_with_indication: dataset
                    .labels
                    .iter()
                    .filter(|record| record.indication_text().is_some())
                    .count(),
                distinct_drug_names,
                icd10_entries: dataset.icd10.len(),
                synonym_entries: dataset.synonyms.len(),
            },
        }
    }
}
