#![deny(unsafe_code)]

pub mod config;
pub mod csv_utils;
pub mod dataset;
pub mod doctor;
pub mod error;
pub mod hash;
pub mod icd10;
pub mod labels;
pub mod spl;
pub mod synonyms;

pub use crate::config::{
    CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE, DataPaths, EngineConfig, locate_config,
};
pub use crate::dataset::{DataFile, Dataset};
pub use crate::doctor::{DoctorCounts, DoctorReport};
pub use crate::error::{DataError, SplError};
pub use crate::icd10::load_icd10_csv;
pub use crate::labels::load_labels;
pub use crate::spl::{load_spl_dir, load_spl_file, parse_spl};
pub use crate::synonyms::{load_synonyms_toml, parse_synonyms_toml};
