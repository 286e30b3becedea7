//! Label corpus loader (JSON array or JSON Lines).

use std::path::Path;

use rxlabel_model::LabelRecord;
use tracing::debug;

use crate::error::DataError;

/// Load label records. Files ending in `.jsonl` are read one record per
/// non-blank line; anything else must hold a JSON array.
pub fn load_labels(path: &Path) -> Result<Vec<LabelRecord>, DataError> {
    let contents = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
    let is_jsonl = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));
    let records = if is_jsonl {
        parse_label_lines(&contents)
    } else {
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    }
    .map_err(|message| DataError::Json {
        path: path.to_path_buf(),
        message,
    })?;
    debug!(path = %path.display(), records = records.len(), "loaded label corpus");
    Ok(records)
}

fn parse_label_lines(contents: &str) -> Result<Vec<LabelRecord>, String> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| format!("line {}: {e}", idx + 1))
        })
        .collect()
}
