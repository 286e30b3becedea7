//! ICD-10 code table loader.

use std::path::Path;

use rxlabel_model::Icd10Entry;
use tracing::debug;

use crate::csv_utils::{find_column, get_field, read_csv_table};
use crate::error::DataError;

const CODE_COLUMNS: &[&str] = &["Full Code", "code"];
const DESCRIPTION_COLUMNS: &[&str] = &["Full Description", "description"];
const CATEGORY_COLUMNS: &[&str] = &["Category Title", "category"];

/// Load ICD-10 entries from a CSV file.
///
/// Accepts the `Full Code` / `Full Description` / `Category Title` layout
/// of published code files as well as plain `code` / `description` /
/// `category` headers. The category column is optional. Rows are returned
/// as-is; validation happens when the index is built.
pub fn load_icd10_csv(path: &Path) -> Result<Vec<Icd10Entry>, DataError> {
    let (headers, rows) = read_csv_table(path)?;
    let missing = |columns: &[&str]| DataError::MissingColumn {
        path: path.to_path_buf(),
        column: columns[0].to_string(),
    };
    let code_col = find_column(&headers, CODE_COLUMNS).ok_or_else(|| missing(CODE_COLUMNS))?;
    let description_col =
        find_column(&headers, DESCRIPTION_COLUMNS).ok_or_else(|| missing(DESCRIPTION_COLUMNS))?;
    let category_col = find_column(&headers, CATEGORY_COLUMNS);

    let entries: Vec<Icd10Entry> = rows
        .iter()
        .map(|row| Icd10Entry {
            code: get_field(row, code_col),
            description: get_field(row, description_col),
            category: category_col
                .map(|col| get_field(row, col))
                .unwrap_or_default(),
        })
        .collect();
    debug!(path = %path.display(), entries = entries.len(), "loaded ICD-10 table");
    Ok(entries)
}
