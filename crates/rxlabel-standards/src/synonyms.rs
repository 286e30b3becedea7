//! Synonym table loader.
//!
//! ```toml
//! [synonyms]
//! hypertension = ["high blood pressure", "HTN"]
//! "heart failure" = ["cardiac failure"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use rxlabel_model::SynonymEntry;
use serde::Deserialize;

use crate::error::DataError;

#[derive(Debug, Default, Deserialize)]
struct SynonymFile {
    #[serde(default)]
    synonyms: BTreeMap<String, Vec<String>>,
}

pub fn load_synonyms_toml(path: &Path) -> Result<Vec<SynonymEntry>, DataError> {
    let contents = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
    parse_synonyms_toml(&contents).map_err(|source| DataError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a synonym table. Entries come back ordered by canonical term.
pub fn parse_synonyms_toml(contents: &str) -> Result<Vec<SynonymEntry>, toml::de::Error> {
    let file: SynonymFile = toml::from_str(contents)?;
    Ok(file
        .synonyms
        .into_iter()
        .map(|(canonical, synonyms)| SynonymEntry::new(canonical, synonyms))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_table() {
        let entries = parse_synonyms_toml(
            r#"
[synonyms]
hypertension = ["high blood pressure", "HTN"]
"heart failure" = ["cardiac failure"]
"#,
        )
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].canonical, "heart failure");
        assert!(entries[1].synonyms.contains("HTN"));
    }

    #[test]
    fn missing_table_is_empty() {
        assert!(parse_synonyms_toml("").unwrap().is_empty());
    }

    #[test]
    fn wrong_shape_is_an_error() {
        assert!(parse_synonyms_toml("[synonyms]\nfever = \"pyrexia\"").is_err());
    }
}
