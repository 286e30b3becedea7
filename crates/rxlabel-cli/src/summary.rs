//! Table and JSON rendering of command results.

use anyhow::Result;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use rxlabel_model::{LabelRecord, MatchResult, ResolvedDrug, SearchCandidate};
use rxlabel_standards::DoctorReport;

/// Scores at or above this are shown green.
const STRONG_SCORE: f64 = 0.9;
/// Scores at or above this (and below `STRONG_SCORE`) are shown yellow.
const FAIR_SCORE: f64 = 0.6;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_resolved(resolved: &ResolvedDrug) {
    println!("Drug: {}", resolved.name);
    if let Some(manufacturer) = &resolved.manufacturer {
        println!("Manufacturer: {manufacturer}");
    }
    println!("Label: {}", resolved.source_id);
    println!("Name match: {}", format_score(resolved.search_score));
    println!();
    println!(
        "Indication: {}",
        resolved.indication.as_deref().unwrap_or("(none)")
    );
    if let Some(directions) = &resolved.directions {
        println!();
        println!("Directions:");
        for line in directions.lines() {
            println!("  {line}");
        }
    }
    println!();
    print_matches(&resolved.icd10_matches);
}

pub fn print_matches(matches: &[MatchResult]) {
    if matches.is_empty() {
        println!("No ICD-10 matches.");
    } else {
        println!("{}", match_table(matches));
    }
}

pub fn print_candidates(candidates: &[SearchCandidate]) {
    if candidates.is_empty() {
        println!("No matching labels.");
    } else {
        println!("{}", candidate_table(candidates));
    }
}

pub fn print_labels(records: &[LabelRecord]) {
    println!("{}", label_table(records));
    println!("{} label(s)", records.len());
}

pub fn print_doctor(report: &DoctorReport) {
    if let Some(path) = &report.config {
        println!("Config: {}", path.display());
    }
    let counts = &report.counts;
    println!(
        "Labels: {} ({} with indication, {} distinct names)",
        counts.labels, counts.labels_with_indication, counts.distinct_drug_names
    );
    println!("ICD-10 entries: {}", counts.icd10_entries);
    println!("Synonym entries: {}", counts.synonym_entries);
    if !report.files.is_empty() {
        println!("{}", file_table(report));
    }
}

pub fn match_table(matches: &[MatchResult]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Description"),
        header_cell("Score"),
        header_cell("Matched on"),
        header_cell("Synonym"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    for result in matches {
        table.add_row(vec![
            Cell::new(result.code()).add_attribute(Attribute::Bold),
            Cell::new(&result.entry.description),
            score_cell(result.score),
            Cell::new(&result.matched_on),
            if result.via_synonym {
                Cell::new("✓").fg(Color::Yellow)
            } else {
                dim_cell("-")
            },
        ]);
    }
    table
}

pub fn candidate_table(candidates: &[SearchCandidate]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Drug"),
        header_cell("Manufacturer"),
        header_cell("Label"),
        header_cell("Score"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for (rank, candidate) in candidates.iter().enumerate() {
        let record = &candidate.record;
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&record.drug_name).add_attribute(Attribute::Bold),
            optional_cell(record.manufacturer.as_deref()),
            Cell::new(&record.source_id),
            score_cell(candidate.score),
        ]);
    }
    table
}

pub fn label_table(records: &[LabelRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Drug"),
        header_cell("Manufacturer"),
        header_cell("Label"),
        header_cell("Published"),
        header_cell("Indication"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Center);
    for record in records {
        table.add_row(vec![
            Cell::new(&record.drug_name).add_attribute(Attribute::Bold),
            optional_cell(record.manufacturer.as_deref()),
            Cell::new(&record.source_id),
            match record.published {
                Some(date) => Cell::new(date),
                None => dim_cell("-"),
            },
            if record.indication_text().is_some() {
                Cell::new("✓").fg(Color::Green)
            } else {
                dim_cell("-")
            },
        ]);
    }
    table
}

fn file_table(report: &DoctorReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Role"),
        header_cell("Path"),
        header_cell("Bytes"),
        header_cell("SHA-256"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for file in &report.files {
        table.add_row(vec![
            Cell::new(&file.role),
            Cell::new(file.path.display()),
            Cell::new(file.bytes),
            dim_cell(short_digest(&file.sha256)),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// Scores are shown with three decimals.
pub fn format_score(score: f64) -> String {
    format!("{score:.3}")
}

fn short_digest(sha256: &str) -> &str {
    sha256.get(..12).unwrap_or(sha256)
}

fn score_cell(score: f64) -> Cell {
    let cell = Cell::new(format_score(score));
    if score >= STRONG_SCORE {
        cell.fg(Color::Green)
    } else if score >= FAIR_SCORE {
        cell.fg(Color::Yellow)
    } else {
        cell
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
