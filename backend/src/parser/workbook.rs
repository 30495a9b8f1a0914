//! Workbook reading.
//!
//! Opens spreadsheet bytes (xlsx, xlsm, xlsb, xls, ods) with calamine and
//! hands back the `Raw Table` sheet as a grid of [`CellValue`]s. No schema
//! knowledge lives here beyond the sheet name.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

use crate::error::{IngestError, IngestResult};
use crate::models::CellValue;

/// Name of the sheet holding one assessment observation per row.
pub const RAW_TABLE_SHEET: &str = "Raw Table";

/// The rows of one sheet, top-left aligned on its used range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    /// Sheet name as found in the workbook.
    pub name: String,
    /// Row-major cells; row 0 holds the headers.
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Read the `Raw Table` sheet out of workbook bytes.
///
/// # Errors
/// * [`IngestError::Io`] if the bytes are not a readable workbook
/// * [`IngestError::Schema`] if no sheet is named `Raw Table`
pub fn read_raw_table(bytes: Vec<u8>) -> IngestResult<RawSheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| IngestError::Io(format!("Could not read the file as a workbook: {}", e)))?;

    let sheet_names = workbook.sheet_names();
    ensure_raw_table(&sheet_names)?;

    let range = workbook
        .worksheet_range(RAW_TABLE_SHEET)
        .map_err(|e| IngestError::Io(format!("Could not read sheet \"{}\": {}", RAW_TABLE_SHEET, e)))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    Ok(RawSheet::new(RAW_TABLE_SHEET, rows))
}

/// Fail with a schema error listing the sheets found when `Raw Table` is absent.
pub fn ensure_raw_table(sheet_names: &[String]) -> IngestResult<()> {
    if sheet_names.iter().any(|name| name == RAW_TABLE_SHEET) {
        return Ok(());
    }
    let found = if sheet_names.is_empty() {
        "none".to_string()
    } else {
        sheet_names.join(", ")
    };
    Err(IngestError::Schema(format!(
        "Sheet \"{}\" not found. Sheets in this file: {}",
        RAW_TABLE_SHEET, found
    )))
}

/// Map a calamine cell onto the pipeline's cell union.
///
/// Error cells (`#N/A`, `#DIV/0!`, ...) count as empty.
fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
