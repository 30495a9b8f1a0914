//! Normalize raw `Raw Table` rows into canonical records.
//!
//! # Layout
//!
//! ```text
//! row 0    │ School │ Date    │ Subject │ Scaled Score │ ...   ← headers, any order
//! row 1..  │ GHS 1  │ 45366   │ Math    │ 412          │ ...   ← one observation per row
//! ```
//!
//! `Date`, `Subject` and `Scaled Score` are required. `School`, `S.no`,
//! `Name`, `Score`, `Percentile`, `Section` and `Class` are optional and
//! default to an empty string or `0`.
//!
//! Blank rows and rows without a subject are dropped silently.

use serde::Serialize;

use crate::error::{IngestError, IngestResult};
use crate::models::{CellValue, Record};
use crate::parser::{parse_number, resolve_date_key, RawSheet};

/// Headers that must be present in row 1, checked in this order.
pub const REQUIRED_COLUMNS: [&str; 3] = ["Date", "Subject", "Scaled Score"];

/// Headers picked up when present.
pub const OPTIONAL_COLUMNS: [&str; 7] = [
    "School",
    "S.no",
    "Name",
    "Score",
    "Percentile",
    "Section",
    "Class",
];

/// What happened while normalizing one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    /// Sheet the records were read from.
    pub sheet: String,
    /// Trimmed header row.
    pub headers: Vec<String>,
    /// Rows after the header row.
    pub data_rows: usize,
    /// Records produced.
    pub record_count: usize,
    /// Rows skipped because every cell was empty.
    pub blank_rows: usize,
    /// Rows skipped because `Subject` was empty.
    pub missing_subject_rows: usize,
}

/// Canonical records plus the summary of how they were obtained.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub records: Vec<Record>,
    pub summary: IngestSummary,
}

/// Column positions resolved once from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    subject: usize,
    scaled_score: usize,
    school: Option<usize>,
    sno: Option<usize>,
    name: Option<usize>,
    score: Option<usize>,
    percentile: Option<usize>,
    section: Option<usize>,
    class: Option<usize>,
}

impl Columns {
    fn resolve(headers: &[String]) -> IngestResult<Self> {
        for required in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == required) {
                let found: Vec<&str> = headers
                    .iter()
                    .map(String::as_str)
                    .filter(|h| !h.is_empty())
                    .collect();
                return Err(IngestError::Schema(format!(
                    "Column \"{}\" not found in row 1. Found columns: {}",
                    required,
                    found.join(", ")
                )));
            }
        }

        let idx = |name: &str| headers.iter().position(|h| h == name);

        // Required columns were checked above.
        Ok(Self {
            date: idx("Date").unwrap_or_default(),
            subject: idx("Subject").unwrap_or_default(),
            scaled_score: idx("Scaled Score").unwrap_or_default(),
            school: idx("School"),
            sno: idx("S.no"),
            name: idx("Name"),
            score: idx("Score"),
            percentile: idx("Percentile"),
            section: idx("Section"),
            class: idx("Class"),
        })
    }

    fn build(&self, row: &[CellValue]) -> Option<Record> {
        let subject = text_at(row, Some(self.subject));
        if subject.is_empty() {
            return None;
        }

        Some(Record {
            school: text_at(row, self.school),
            date_key: resolve_date_key(cell_at(row, Some(self.date))),
            subject,
            sno: text_at(row, self.sno),
            name: text_at(row, self.name),
            score: parse_number(cell_at(row, self.score)),
            scaled_score: parse_number(cell_at(row, Some(self.scaled_score))),
            percentile: parse_number(cell_at(row, self.percentile)),
            section: text_at(row, self.section),
            class_name: text_at(row, self.class),
        })
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Cell at an optional column; short rows and absent columns read as empty.
fn cell_at(row: &[CellValue], idx: Option<usize>) -> &CellValue {
    idx.and_then(|i| row.get(i)).unwrap_or(&EMPTY_CELL)
}

fn text_at(row: &[CellValue], idx: Option<usize>) -> String {
    cell_at(row, idx).to_text().trim().to_string()
}

/// Normalize a `Raw Table` sheet.
///
/// # Errors
/// * [`IngestError::Shape`] if the sheet has fewer than 2 rows
/// * [`IngestError::Schema`] if a required column is missing
/// * [`IngestError::Data`] if no record survives
pub fn normalize(sheet: &RawSheet) -> IngestResult<Normalized> {
    if sheet.rows.len() < 2 {
        return Err(IngestError::Shape(
            "Too few rows. Expected headers on row 1 and data from row 2.".to_string(),
        ));
    }

    let headers: Vec<String> = sheet.rows[0]
        .iter()
        .map(|cell| cell.to_text().trim().to_string())
        .collect();
    let columns = Columns::resolve(&headers)?;

    let mut records = Vec::new();
    let mut blank_rows = 0;
    let mut missing_subject_rows = 0;

    for row in &sheet.rows[1..] {
        if row.iter().all(CellValue::is_blank) {
            blank_rows += 1;
            continue;
        }
        match columns.build(row) {
            Some(record) => records.push(record),
            None => missing_subject_rows += 1,
        }
    }

    if records.is_empty() {
        return Err(IngestError::Data(
            "No valid data rows found. Make sure data starts from row 2 and Subject is filled in."
                .to_string(),
        ));
    }

    let summary = IngestSummary {
        sheet: sheet.name.clone(),
        headers,
        data_rows: sheet.rows.len() - 1,
        record_count: records.len(),
        blank_rows,
        missing_subject_rows,
    };

    Ok(Normalized { records, summary })
}

/// Normalize bare rows, as if they were the `Raw Table` sheet.
pub fn normalize_rows(rows: Vec<Vec<CellValue>>) -> IngestResult<Vec<Record>> {
    let sheet = RawSheet::new(crate::parser::RAW_TABLE_SHEET, rows);
    normalize(&sheet).map(|n| n.records)
}
