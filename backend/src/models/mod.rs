//! Domain models for the Scorecard pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`CellValue`] - A raw, loosely-typed spreadsheet cell
//! - [`Record`] - One canonical assessment observation
//! - [`Metric`] - The numeric field selected for derived views
//! - [`Subject`] - The fixed subjects every view is broken down by
//! - [`SubjectValues`] - One optional value per fixed subject

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

// =============================================================================
// Raw Cells
// =============================================================================

/// A raw spreadsheet cell, as handed over by the workbook reader.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No content.
    #[default]
    Empty,
    /// Free text, untrimmed.
    Text(String),
    /// Any numeric cell, including date serials the reader could not type.
    Number(f64),
    /// Boolean cell.
    Bool(bool),
    /// Native date-time cell.
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// True for empty cells and empty strings. Whitespace is content.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Render the cell as text the way a spreadsheet export would.
    ///
    /// Integral numbers print without a fractional part (`7`, not `7.0`).
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => b.to_string(),
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

// =============================================================================
// Canonical Record
// =============================================================================

/// One normalized assessment observation: one student, one subject, one date.
///
/// Numeric fields hold `0` when the source value was absent or unparsable.
/// Aggregations treat any value `<= 0` as missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub school: String,
    /// `YYYY-MM` or `Unknown`; never empty.
    pub date_key: String,
    pub subject: String,
    pub sno: String,
    pub name: String,
    pub score: f64,
    pub scaled_score: f64,
    pub percentile: f64,
    pub section: String,
    #[serde(rename = "class")]
    pub class_name: String,
}

impl Record {
    /// Identity used for distinct-student counts: name, else roll number.
    pub fn student_key(&self) -> &str {
        if self.name.is_empty() {
            &self.sno
        } else {
            &self.name
        }
    }
}

// =============================================================================
// Metric
// =============================================================================

/// The numeric field every derived view is computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Score,
    #[default]
    ScaledScore,
    Percentile,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Score, Metric::ScaledScore, Metric::Percentile];

    /// Read this metric off a record.
    pub fn value(&self, record: &Record) -> f64 {
        match self {
            Self::Score => record.score,
            Self::ScaledScore => record.scaled_score,
            Self::Percentile => record.percentile,
        }
    }

    /// Wire name (`score`, `scaledScore`, `percentile`).
    pub fn key(&self) -> &'static str {
        match self {
            Self::Score => "score",
            Self::ScaledScore => "scaledScore",
            Self::Percentile => "percentile",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Score => "Score",
            Self::ScaledScore => "Scaled Score",
            Self::Percentile => "Percentile",
        }
    }

    pub fn column_header(&self) -> &'static str {
        match self {
            Self::Score => "Avg Score",
            Self::ScaledScore => "Avg Scaled Score",
            Self::Percentile => "Avg Percentile",
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Percentile => "th",
            _ => "",
        }
    }

    /// A value of this metric as shown to people, e.g. `67th`.
    pub fn display_value(&self, value: f64) -> String {
        format!("{}{}", value, self.suffix())
    }

    /// Minimum absolute period-over-period delta that counts as a movement.
    pub fn delta_threshold(&self) -> f64 {
        match self {
            Self::Percentile => 3.0,
            _ => 5.0,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.key() == s.trim())
            .ok_or_else(|| {
                format!(
                    "Unknown metric '{}'. Expected one of: score, scaledScore, percentile",
                    s
                )
            })
    }
}

// =============================================================================
// Subjects
// =============================================================================

/// The fixed subjects every view is broken down by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Math,
    English,
    Science,
}

impl Subject {
    pub const ALL: [Subject; 3] = [Subject::Math, Subject::English, Subject::Science];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Math => "Math",
            Self::English => "English",
            Self::Science => "Science",
        }
    }

    /// Whether a record's free-text subject is this one.
    pub fn matches(&self, record: &Record) -> bool {
        record.subject == self.as_str()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One optional value per fixed subject.
///
/// Serializes as `{"Math": .., "English": .., "Science": ..}` with `null`
/// for subjects without data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SubjectValues {
    #[serde(rename = "Math")]
    pub math: Option<f64>,
    #[serde(rename = "English")]
    pub english: Option<f64>,
    #[serde(rename = "Science")]
    pub science: Option<f64>,
}

impl SubjectValues {
    /// Build by evaluating `f` once per subject, in fixed order.
    pub fn from_fn(mut f: impl FnMut(Subject) -> Option<f64>) -> Self {
        Self {
            math: f(Subject::Math),
            english: f(Subject::English),
            science: f(Subject::Science),
        }
    }

    pub fn get(&self, subject: Subject) -> Option<f64> {
        match subject {
            Subject::Math => self.math,
            Subject::English => self.english,
            Subject::Science => self.science,
        }
    }

    /// Values in fixed subject order.
    pub fn iter(&self) -> impl Iterator<Item = (Subject, Option<f64>)> + '_ {
        Subject::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

// =============================================================================
// Tests
// =============================================================================
