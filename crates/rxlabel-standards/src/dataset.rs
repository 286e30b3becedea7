//! Loading every configured data source at once.

use std::path::{Path, PathBuf};

use rxlabel_model::{Icd10Entry, LabelRecord, SynonymEntry};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::DataPaths;
use crate::error::DataError;
use crate::hash::sha256_hex;
use crate::icd10::load_icd10_csv;
use crate::labels::load_labels;
use crate::spl::load_spl_file;
use crate::synonyms::load_synonyms_toml;

/// A data file that fed the engine, with its content fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataFile {
    pub role: String,
    pub path: PathBuf,
    pub sha256: String,
    pub bytes: u64,
}

impl DataFile {
    pub fn fingerprint(role: &str, path: &Path) -> Result<Self, DataError> {
        let contents = std::fs::read(path).map_err(|e| DataError::io(path, e))?;
        Ok(Self {
            role: role.to_string(),
            path: path.to_path_buf(),
            sha256: sha256_hex(&contents),
            bytes: contents.len() as u64,
        })
    }
}

/// Raw inputs of the engine, not yet indexed.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub labels: Vec<LabelRecord>,
    pub icd10: Vec<Icd10Entry>,
    pub synonyms: Vec<SynonymEntry>,
    pub files: Vec<DataFile>,
}

impl Dataset {
    /// Load every configured source. A configured path that cannot be read
    /// or parsed fails the load; an unconfigured source is skipped with a
    /// warning. Labels from the corpus file come before SPL documents.
    pub fn load(paths: &DataPaths) -> Result<Self, DataError> {
        let mut dataset = Self::default();

        match &paths.icd10 {
            Some(path) => {
                dataset.icd10 = load_icd10_csv(path)?;
                dataset.files.push(DataFile::fingerprint("icd10", path)?);
            }
            None => warn!("no ICD-10 table configured; indications will not be coded"),
        }

        if let Some(path) = &paths.labels {
            dataset.labels = load_labels(path)?;
            dataset.files.push(DataFile::fingerprint("labels", path)?);
        }

        if let Some(dir) = &paths.spl_dir {
            for path in spl_files(dir)? {
                dataset.labels.push(load_spl_file(&path)?);
                dataset.files.push(DataFile::fingerprint("spl", &path)?);
            }
        }

        if paths.labels.is_none() && paths.spl_dir.is_none() {
            warn!("no label corpus or SPL directory configured");
        }

        if let Some(path) = &paths.synonyms {
            dataset.synonyms = load_synonyms_toml(path)?;
            dataset.files.push(DataFile::fingerprint("synonyms", path)?);
        }

        info!(
            labels = dataset.labels.len(),
            icd10 = dataset.icd10.len(),
            synonyms = dataset.synonyms.len(),
            files = dataset.files.len(),
            "loaded data"
        );
        Ok(dataset)
    }
}

/// `*.xml` files of a directory in file name order.
pub(crate) fn spl_files(dir: &Path) -> Result<Vec<PathBuf>, DataError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| DataError::io(dir, e))? {
        let path = entry.map_err(|e| DataError::io(dir, e))?.path();
        let is_xml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if is_xml && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
