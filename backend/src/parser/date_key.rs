//! Date key resolution.
//!
//! Turns whatever a spreadsheet put in the `Date` column into a month bucket
//! key: `YYYY-MM` for anything that reads as a date, the trimmed text for
//! free-form labels (e.g. a term name), and `Unknown` for nothing at all.
//!
//! ```text
//! DateTime(2024-03-15 00:00)  →  "2024-03"
//! Number(45366.0)             →  "2024-03"   (serial day, 0 = 1899-12-30)
//! Text("15 March 2024")       →  "2024-03"
//! Text("  Term 1 ")           →  "Term 1"
//! Empty / Text("")            →  "Unknown"
//! ```

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::CellValue;

/// Key used when a date cell carries nothing usable.
pub const UNKNOWN_DATE: &str = "Unknown";

/// Days between the spreadsheet serial epoch (1899-12-30) and 1970-01-01.
const SERIAL_UNIX_OFFSET_DAYS: f64 = 25569.0;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Upper bound of representable timestamps, in milliseconds (±100M days).
const MAX_TIMESTAMP_MS: f64 = 8.64e15;

static DATE_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})$").unwrap());

static YEAR_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").unwrap());

/// Full-date layouts tried in order by [`parse_date_text`].
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d-%B-%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Resolve one raw date cell to its month key. Never fails.
pub fn resolve_date_key(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => UNKNOWN_DATE.to_string(),
        CellValue::DateTime(dt) => month_key(dt.date()),
        CellValue::Number(n) => serial_to_date(*n)
            .map(month_key)
            .unwrap_or_else(|| UNKNOWN_DATE.to_string()),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return UNKNOWN_DATE.to_string();
            }
            match parse_date_text(trimmed) {
                Some(date) => month_key(date),
                None => trimmed.to_string(),
            }
        }
        CellValue::Bool(b) => b.to_string(),
    }
}

/// Convert a serial day count to a UTC calendar date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    let ms = ((serial - SERIAL_UNIX_OFFSET_DAYS) * MS_PER_DAY).round();
    if !ms.is_finite() || ms.abs() > MAX_TIMESTAMP_MS {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(ms as i64).map(|dt| dt.date_naive())
}

/// Generic date parsing for free text.
///
/// Values carrying an offset are shifted to UTC; naive values are taken as UTC.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }

    // Month-granular text: "2024-03", "March 2024", "Mar 2024", "2024"
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {}", text), "%d %B %Y") {
        return Some(date);
    }
    if YEAR_ONLY_RE.is_match(text) {
        return NaiveDate::parse_from_str(&format!("{}-01-01", text), "%Y-%m-%d").ok();
    }

    None
}

fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

fn key_to_date(key: &str) -> Option<NaiveDate> {
    let caps = DATE_KEY_RE.captures(key)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Long display form of a date key: `2024-03` → `March 2024`.
///
/// Keys that are not `YYYY-MM` are returned unchanged.
pub fn format_date_full(key: &str) -> String {
    match key_to_date(key) {
        Some(date) => date.format("%B %Y").to_string(),
        None => key.to_string(),
    }
}

/// Axis-label form of a date key: `2024-03` → `Mar 24`.
pub fn format_date_short(key: &str) -> String {
    match key_to_date(key) {
        Some(date) => date.format("%b %y").to_string(),
        None => key.to_string(),
    }
}
