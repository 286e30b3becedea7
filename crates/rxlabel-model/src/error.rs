use thiserror::Error;

/// Rejection of externally supplied data while an index is being built.
///
/// Query-time code assumes a well-formed index, so every malformed entry
/// fails construction instead of being skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("ICD-10 entry at position {position} has no code")]
    MissingCode { position: usize },

    #[error("ICD-10 code {code:?} is not a valid code")]
    InvalidCode { code: String },

    #[error("duplicate ICD-10 code {code}")]
    DuplicateCode { code: String },

    #[error("ICD-10 code {code} has no description")]
    MissingDescription { code: String },

    #[error("label record at position {position} (source {source_id:?}) has no drug name")]
    MissingDrugName { position: usize, source_id: String },

    #[error("synonym table contains an empty canonical term")]
    EmptySynonymTerm,
}

/// Query-time outcome when no label can be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no label matches {query:?}")]
    NotFound { query: String },

    #[error("query is empty")]
    EmptyInput,
}

impl ResolveError {
    /// Both variants mean "nothing to return" to a caller.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::EmptyInput)
    }
}
