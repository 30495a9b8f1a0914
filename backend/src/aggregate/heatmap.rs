//! Class × subject matrix.

use serde::Serialize;
use std::collections::HashSet;

use super::rounded_average;
use crate::models::{Metric, Record, Subject, SubjectValues};
use crate::palette::{bucket_for, Bucket, CellStyle};

/// Range used when no cell has data.
const DEFAULT_MIN: f64 = 0.0;
const DEFAULT_MAX: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRow {
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(flatten)]
    pub values: SubjectValues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassHeatmap {
    pub matrix: Vec<HeatmapRow>,
    /// Smallest non-null cell.
    pub min: f64,
    /// Largest non-null cell.
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledCell {
    pub subject: Subject,
    pub value: Option<f64>,
    pub bucket: Bucket,
    pub style: CellStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledRow {
    #[serde(rename = "class")]
    pub class_name: String,
    pub cells: Vec<StyledCell>,
}

impl ClassHeatmap {
    /// Pair every cell with its colour bucket over this heatmap's range.
    pub fn styled(&self) -> Vec<StyledRow> {
        self.matrix
            .iter()
            .map(|row| StyledRow {
                class_name: row.class_name.clone(),
                cells: row
                    .values
                    .iter()
                    .map(|(subject, value)| {
                        let bucket = bucket_for(value, self.min, self.max);
                        StyledCell {
                            subject,
                            value,
                            bucket,
                            style: bucket.style(),
                        }
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Distinct non-empty classes in first-seen order.
pub(crate) fn distinct_classes(records: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|r| r.class_name.as_str())
        .filter(|c| !c.is_empty() && seen.insert(*c))
        .map(String::from)
        .collect()
}

/// Decimal class labels only. Words such as `inf` or `NaN` stay text.
fn class_number(class: &str) -> Option<f64> {
    let class = class.trim();
    let numeric = class
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !numeric || !class.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    class.parse::<f64>().ok()
}

/// Numeric order when every class is a number, string order otherwise.
pub(crate) fn sort_classes(classes: &mut [String]) {
    let numbers: Option<Vec<f64>> = classes.iter().map(|c| class_number(c)).collect();
    match numbers {
        Some(_) => classes.sort_by(|a, b| {
            let (na, nb) = (class_number(a).unwrap_or_default(), class_number(b).unwrap_or_default());
            na.total_cmp(&nb).then_with(|| a.cmp(b))
        }),
        None => classes.sort(),
    }
}

/// Average of the active metric for every class and subject.
pub fn class_heatmap(records: &[Record], metric: Metric) -> ClassHeatmap {
    let mut classes = distinct_classes(records);
    sort_classes(&mut classes);

    let matrix: Vec<HeatmapRow> = classes
        .into_iter()
        .map(|class_name| {
            let values = SubjectValues::from_fn(|subject| {
                rounded_average(
                    records
                        .iter()
                        .filter(|r| r.class_name == class_name && subject.matches(r)),
                    metric,
                )
            });
            HeatmapRow { class_name, values }
        })
        .collect();

    let present: Vec<f64> = matrix
        .iter()
        .flat_map(|row| row.values.iter().filter_map(|(_, v)| v))
        .collect();

    let (min, max) = if present.is_empty() {
        (DEFAULT_MIN, DEFAULT_MAX)
    } else {
        (
            present.iter().copied().fold(f64::INFINITY, f64::min),
            present.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        )
    };

    ClassHeatmap { matrix, min, max }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::rec;

    #[test]
    fn test_missing_cell_is_null_and_neutral() {
        let records = vec![
            rec("2024-01", "Math", "7", 60.0),
            rec("2024-01", "English", "7", 80.0),
            rec("2024-01", "Math", "8", 70.0),
            rec("2024-01", "Science", "8", 0.0),
        ];

        let heatmap = class_heatmap(&records, Metric::ScaledScore);
        assert_eq!(heatmap.matrix.len(), 2);
        let seven = &heatmap.matrix[0];
        assert_eq!(seven.class_name, "7");
        assert_eq!(seven.values.science, None);
        assert_eq!(heatmap.matrix[1].values.science, None);
        assert_eq!(heatmap.min, 60.0);
        assert_eq!(heatmap.max, 80.0);

        let styled = heatmap.styled();
        let science = &styled[0].cells[2];
        assert_eq!(science.subject, Subject::Science);
        assert_eq!(science.bucket, Bucket::Neutral);
        assert_eq!(styled[0].cells[0].bucket, Bucket::Red);
        assert_eq!(styled[0].cells[1].bucket, Bucket::Green);
    }

    #[test]
    fn test_numeric_class_order() {
        let mut classes: Vec<String> = ["10", "9", "09", "1"].iter().map(|s| s.to_string()).collect();
        sort_classes(&mut classes);
        assert_eq!(classes, ["1", "09", "9", "10"]);
    }

    #[test]
    fn test_mixed_class_order_is_lexicographic() {
        let mut classes: Vec<String> = ["10", "9", "KG"].iter().map(|s| s.to_string()).collect();
        sort_classes(&mut classes);
        assert_eq!(classes, ["10", "9", "KG"]);
    }

    #[test]
    fn test_infinity_words_are_not_numbers() {
        for word in ["Inf", "inf", "infinity", "NaN"] {
            let mut classes: Vec<String> = ["10", "9", word].iter().map(|s| s.to_string()).collect();
            sort_classes(&mut classes);
            assert_eq!(classes, ["10", "9", word], "{}", word);
        }

        let mut classes: Vec<String> = ["1e1", "9", "-1"].iter().map(|s| s.to_string()).collect();
        sort_classes(&mut classes);
        assert_eq!(classes, ["-1", "9", "1e1"]);
    }

    #[test]
    fn test_empty_heatmap_defaults() {
        let heatmap = class_heatmap(&[rec("2024-01", "Math", "", 50.0)], Metric::ScaledScore);
        assert!(heatmap.matrix.is_empty());
        assert_eq!((heatmap.min, heatmap.max), (0.0, 100.0));

        let heatmap = class_heatmap(&[rec("2024-01", "Math", "6", 0.0)], Metric::ScaledScore);
        assert_eq!(heatmap.matrix.len(), 1);
        assert_eq!((heatmap.min, heatmap.max), (0.0, 100.0));
    }

    #[test]
    fn test_single_value_is_flat() {
        let heatmap = class_heatmap(&[rec("2024-01", "Math", "6", 55.0)], Metric::ScaledScore);
        assert_eq!((heatmap.min, heatmap.max), (55.0, 55.0));
        assert_eq!(heatmap.styled()[0].cells[0].bucket, Bucket::Flat);
    }

    #[test]
    fn test_row_json_shape() {
        let heatmap = class_heatmap(&[rec("2024-01", "Math", "6", 55.0)], Metric::ScaledScore);
        let json = serde_json::to_value(&heatmap).unwrap();
        assert_eq!(json["matrix"][0]["class"], "6");
        assert_eq!(json["matrix"][0]["Math"], 55.0);
        assert!(json["matrix"][0]["English"].is_null());
    }
}
