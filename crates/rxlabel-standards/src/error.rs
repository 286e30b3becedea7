use std::path::PathBuf;

/// Failure to read or parse one of the engine's data files.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("missing column {column:?} in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("failed to parse JSON {path}: {message}")]
    Json { path: PathBuf, message: String },

    #[error("failed to parse TOML {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid SPL document {path}: {source}")]
    Spl {
        path: PathBuf,
        #[source]
        source: SplError,
    },

    #[error("no configuration file found (tried {tried})")]
    ConfigNotFound { tried: String },
}

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure to turn an SPL XML document into a label record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplError {
    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("document has no manufactured product name")]
    MissingDrugName,
}
