//! Engine configuration file (`rxlabel.toml`).
//!
//! ```toml
//! [data]
//! icd10 = "data/icd10.csv"
//! labels = "data/labels.jsonl"
//! spl_dir = "data/spl"
//! synonyms = "data/synonyms.toml"
//!
//! [matcher]
//! max_results = 5
//!
//! [search]
//! selection = "most-recent"
//! ```
//!
//! Relative data paths resolve against the directory holding the file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use rxlabel_model::{EngineOptions, MatcherOptions, SearchOptions};
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "RXLABEL_CONFIG";

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "rxlabel.toml";

/// Locations of the engine's input data. Unset entries are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub icd10: Option<PathBuf>,
    pub labels: Option<PathBuf>,
    pub spl_dir: Option<PathBuf>,
    pub synonyms: Option<PathBuf>,
}

impl DataPaths {
    fn resolve_against(&mut self, base: &Path) {
        for path in [
            &mut self.icd10,
            &mut self.labels,
            &mut self.spl_dir,
            &mut self.synonyms,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub data: DataPaths,
    pub matcher: MatcherOptions,
    pub search: SearchOptions,
}

impl EngineConfig {
    /// Load a configuration file, resolving relative data paths against
    /// its directory.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let contents = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_toml_str(&contents, base).map_err(|source| DataError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(contents: &str, base: &Path) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(contents)?;
        config.data.resolve_against(base);
        Ok(config)
    }

    pub fn options(&self) -> EngineOptions {
        EngineOptions {
            matcher: self.matcher.clone(),
            search: self.search.clone(),
        }
    }
}

/// Find the configuration file: explicit path, then `RXLABEL_CONFIG`, then
/// `./rxlabel.toml`.
pub fn locate_config(explicit: Option<&Path>) -> Result<PathBuf, DataError> {
    pick_config_path(
        explicit,
        std::env::var_os(CONFIG_ENV_VAR),
        Path::new(DEFAULT_CONFIG_FILE),
    )
}

fn pick_config_path(
    explicit: Option<&Path>,
    env: Option<OsString>,
    fallback: &Path,
) -> Result<PathBuf, DataError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(value) = env.filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(value));
    }
    if fallback.is_file() {
        return Ok(fallback.to_path_buf());
    }
    Err(DataError::ConfigNotFound {
        tried: format!("--config, ${CONFIG_ENV_VAR}, {}", fallback.display()),
    })
}
