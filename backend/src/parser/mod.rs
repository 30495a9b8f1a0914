//! Raw spreadsheet input: workbook reading, date keys and numeric coercion.
//!
//! Nothing here knows about the canonical record layout; see
//! [`crate::transform::normalizer`] for that.

pub mod date_key;
pub mod workbook;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::CellValue;

pub use date_key::{format_date_full, format_date_short, resolve_date_key, UNKNOWN_DATE};
pub use workbook::{read_raw_table, RawSheet, RAW_TABLE_SHEET};

static NUMBER_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").unwrap());

/// Coerce a cell to a number, falling back to `0`.
///
/// Text is read up to its longest numeric prefix (`"85%"` → `85`,
/// `" 7.5 pts"` → `7.5`). Anything without one, and any non-finite result,
/// becomes `0`.
pub fn parse_number(cell: &CellValue) -> f64 {
    let value = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => parse_number_prefix(s).unwrap_or(0.0),
        _ => 0.0,
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Longest leading decimal literal of `text`, after leading whitespace.
pub fn parse_number_prefix(text: &str) -> Option<f64> {
    NUMBER_PREFIX_RE
        .find(text.trim_start())
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_cells() {
        assert_eq!(parse_number(&CellValue::Number(72.5)), 72.5);
        assert_eq!(parse_number(&CellValue::from("72.5")), 72.5);
        assert_eq!(parse_number(&CellValue::Empty), 0.0);
        assert_eq!(parse_number(&CellValue::Bool(true)), 0.0);
        assert_eq!(parse_number(&CellValue::Number(f64::INFINITY)), 0.0);
    }

    #[test]
    fn test_parse_number_prefix() {
        assert_eq!(parse_number_prefix("85%"), Some(85.0));
        assert_eq!(parse_number_prefix("  7.5 pts"), Some(7.5));
        assert_eq!(parse_number_prefix(".5"), Some(0.5));
        assert_eq!(parse_number_prefix("-3"), Some(-3.0));
        assert_eq!(parse_number_prefix("1e2x"), Some(100.0));
        assert_eq!(parse_number_prefix("12."), Some(12.0));
        assert_eq!(parse_number_prefix("abc"), None);
        assert_eq!(parse_number_prefix(""), None);
        assert_eq!(parse_number(&CellValue::from("n/a")), 0.0);
    }
}
