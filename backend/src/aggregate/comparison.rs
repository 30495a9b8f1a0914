//! Per-school comparison rows.

use serde::Serialize;

use super::{rounded_average, unique_schools};
use crate::models::{Metric, Record, SubjectValues};

/// Names longer than this are shortened for display.
const MAX_DISPLAY_CHARS: usize = 22;
/// Characters kept before the ellipsis.
const TRUNCATED_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolRow {
    /// Display name, possibly shortened.
    pub school: String,
    pub full_name: String,
    #[serde(flatten)]
    pub values: SubjectValues,
}

/// Shorten a school name for chart labels.
pub fn display_name(name: &str) -> String {
    if name.chars().count() > MAX_DISPLAY_CHARS {
        let head: String = name.chars().take(TRUNCATED_CHARS).collect();
        format!("{}…", head)
    } else {
        name.to_string()
    }
}

/// One row per school, subject columns on the active metric.
pub fn school_comparison(records: &[Record], metric: Metric) -> Vec<SchoolRow> {
    unique_schools(records)
        .into_iter()
        .map(|school| {
            let values = SubjectValues::from_fn(|subject| {
                rounded_average(
                    records
                        .iter()
                        .filter(|r| r.school == school && subject.matches(r)),
                    metric,
                )
            });
            SchoolRow {
                school: display_name(&school),
                full_name: school,
                values,
            }
        })
        .collect()
}
