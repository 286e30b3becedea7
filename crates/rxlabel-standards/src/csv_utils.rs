//! Shared CSV utilities for loading data tables.

use std::collections::BTreeMap;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::DataError;

pub type CsvRow = BTreeMap<String, String>;

/// Read a CSV file into its header names and a vector of row maps.
///
/// Handles BOM characters and trims whitespace from headers and values.
pub fn read_csv_table(path: &Path) -> Result<(Vec<String>, Vec<CsvRow>), DataError> {
    let csv_error = |e: csv::Error| DataError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let mut row = BTreeMap::new();
        for (idx, value) in record.iter().enumerate() {
            let key = headers.get(idx).cloned().unwrap_or_default();
            row.insert(key, value.trim().to_string());
        }
        rows.push(row);
    }
    Ok((headers, rows))
}

/// Read a CSV file into a vector of row maps keyed by header.
pub fn read_csv_rows(path: &Path) -> Result<Vec<CsvRow>, DataError> {
    read_csv_table(path).map(|(_, rows)| rows)
}

/// Get a field value from a row, returning empty string if not present.
pub fn get_field(row: &CsvRow, key: &str) -> String {
    row.get(key).cloned().unwrap_or_default()
}

/// Get an optional field value from a row (None if empty or missing).
pub fn get_optional(row: &CsvRow, key: &str) -> Option<String> {
    row.get(key).filter(|v| !v.is_empty()).cloned()
}

/// First of `candidates` present in `headers`, compared case-insensitively.
/// Returns the header as spelled in the file.
pub fn find_column<'h>(headers: &'h [String], candidates: &[&str]) -> Option<&'h str> {
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .find(|header| header.eq_ignore_ascii_case(candidate))
            .map(String::as_str)
    })
}
