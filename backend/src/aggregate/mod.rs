//! Aggregation engine: every dashboard view derived from canonical records.
//!
//! All functions are pure. They take the (already school-filtered) record
//! slice plus a [`Metric`] and return plain serializable structures. Nothing
//! is cached; callers recompute on every parameter change.
//!
//! # Missing values
//!
//! A numeric field equal to `0` means "absent". Every average in this module
//! only looks at values `> 0`, and sample counts only count those values.
//! A genuine score of `0` is therefore indistinguishable from a blank cell.
//!
//! # Views
//!
//! | View | Function |
//! |------|----------|
//! | Header summary | [`header_stats`] |
//! | Subject cards | [`subject_stats`] |
//! | Trend lines | [`trend_data`] |
//! | Quartile gap | [`quartile_gap`] |
//! | Class × subject heatmap | [`class_heatmap`] |
//! | Top / bottom combos | [`top_bottom`] |
//! | School comparison | [`school_comparison`] |
//! | Everything at once | [`Dashboard::build`] |

pub mod comparison;
pub mod dashboard;
pub mod heatmap;
pub mod ranking;
pub mod summary;
pub mod trend;

use std::collections::BTreeSet;

use crate::models::{Metric, Record};

pub use comparison::{school_comparison, SchoolRow};
pub use dashboard::{Dashboard, DashboardQuery};
pub use heatmap::{class_heatmap, ClassHeatmap, HeatmapRow, StyledCell, StyledRow};
pub use ranking::{top_bottom, RankedCombo, Ranking, RANKING_SIZE};
pub use summary::{header_stats, subject_stats, Direction, HeaderStats, SubjectStat};
pub use trend::{quartile_gap, trend_data, Quartile, QuartileGap, QuartileGapPoint, TrendPoint};

/// Round to one decimal place, halves toward positive infinity.
///
/// Operates on the binary value as-is: `round1(2.45) == 2.5` because
/// `2.45 * 10.0` is exactly `24.5`, while `round1(-2.45) == -2.4`.
pub fn round1(x: f64) -> f64 {
    let scaled = x * 10.0;
    let floor = scaled.floor();
    let rounded = if scaled - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded / 10.0
}

/// Arithmetic mean, `None` for an empty slice.
pub fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Metric values that count as present (`> 0`).
pub fn valid_values<'a>(records: impl IntoIterator<Item = &'a Record>, metric: Metric) -> Vec<f64> {
    records
        .into_iter()
        .map(|r| metric.value(r))
        .filter(|v| *v > 0.0)
        .collect()
}

/// Unrounded mean of the present metric values.
pub fn metric_average<'a>(records: impl IntoIterator<Item = &'a Record>, metric: Metric) -> Option<f64> {
    average(&valid_values(records, metric))
}

/// Rounded mean of the present metric values.
pub fn rounded_average<'a>(records: impl IntoIterator<Item = &'a Record>, metric: Metric) -> Option<f64> {
    metric_average(records, metric).map(round1)
}

/// Distinct non-empty date keys, ascending.
///
/// `YYYY-MM` keys sort chronologically; other keys sort as strings.
pub fn unique_dates(records: &[Record]) -> Vec<String> {
    distinct_sorted(records.iter().map(|r| r.date_key.as_str()))
}

/// Distinct non-empty school names, ascending.
pub fn unique_schools(records: &[Record]) -> Vec<String> {
    distinct_sorted(records.iter().map(|r| r.school.as_str()))
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Records of one school, or all records when no school is selected.
pub fn filter_by_school(records: &[Record], school: Option<&str>) -> Vec<Record> {
    match school {
        Some(school) => records.iter().filter(|r| r.school == school).cloned().collect(),
        None => records.to_vec(),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::rec;
    use super::*;

    #[test]
    fn test_round1_binary_semantics() {
        assert_eq!(round1(2.449999), 2.4);
        // 2.45 * 10.0 is exactly 24.5 in binary, which rounds up
        assert_eq!(round1(2.45), 2.5);
        assert_eq!(round1(-2.45), -2.4);
        assert_eq!(round1(-2.46), -2.5);
        assert_eq!(round1(71.25), 71.3);
        assert_eq!(round1(0.0), 0.0);
        assert_eq!(round1(10.0), 10.0);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(&[]), None);
        assert_eq!(average(&[80.0, 60.0]), Some(70.0));
    }

    #[test]
    fn test_sentinel_values_excluded() {
        let records = vec![
            rec("2024-01", "Math", "6", 80.0),
            rec("2024-01", "Math", "6", 0.0),
            rec("2024-01", "Math", "6", -4.0),
        ];
        assert_eq!(valid_values(&records, Metric::ScaledScore), vec![80.0]);
        assert_eq!(metric_average(&records, Metric::ScaledScore), Some(80.0));
        assert_eq!(metric_average(&records, Metric::Percentile), None);
    }

    #[test]
    fn test_unique_dates_sorted_distinct() {
        let records = vec![
            rec("2024-02", "Math", "6", 1.0),
            rec("Unknown", "Math", "6", 1.0),
            rec("2023-11", "Math", "6", 1.0),
            rec("2024-02", "Math", "6", 1.0),
            rec("", "Math", "6", 1.0),
        ];
        let dates = unique_dates(&records);
        assert_eq!(dates, ["2023-11", "2024-02", "Unknown"]);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_unique_schools_and_filter() {
        let mut a = rec("2024-01", "Math", "6", 1.0);
        a.school = "Zeta".into();
        let mut b = rec("2024-01", "Math", "6", 2.0);
        b.school = "Alpha".into();
        let c = rec("2024-01", "Math", "6", 3.0);
        let records = vec![a, b, c];

        assert_eq!(unique_schools(&records), ["Alpha", "Zeta"]);
        assert_eq!(filter_by_school(&records, Some("Zeta")).len(), 1);
        assert_eq!(filter_by_school(&records, Some("Nowhere")).len(), 0);
        assert_eq!(filter_by_school(&records, None).len(), 3);
    }
}
