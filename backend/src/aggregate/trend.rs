//! Time series: per-subject trend lines and the quartile gap.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::{average, round1, rounded_average, unique_dates, valid_values};
use crate::models::{Metric, Record, SubjectValues};
use crate::parser::format_date_short;

/// One point per date, one value per subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date_key: String,
    pub date_label: String,
    #[serde(flatten)]
    pub values: SubjectValues,
}

/// Average of the active metric per date and subject.
///
/// Every date yields a point, even when all its subjects are `null`.
pub fn trend_data(records: &[Record], metric: Metric) -> Vec<TrendPoint> {
    unique_dates(records)
        .into_iter()
        .map(|date_key| {
            let values = SubjectValues::from_fn(|subject| {
                rounded_average(
                    records
                        .iter()
                        .filter(|r| r.date_key == date_key && subject.matches(r)),
                    metric,
                )
            });
            TrendPoint {
                date_label: format_date_short(&date_key),
                date_key,
                values,
            }
        })
        .collect()
}

// =============================================================================
// Quartile gap
// =============================================================================

/// A rank quarter of the values on one date, 1 (bottom) to 4 (top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Quartile(u8);

impl Quartile {
    pub fn new(q: u8) -> Option<Self> {
        (1..=4).contains(&q).then_some(Self(q))
    }

    /// Index range of this quarter within `n` ascending values.
    fn bounds(&self, n: usize) -> std::ops::Range<usize> {
        let q = self.0 as usize;
        (q - 1) * n / 4..q * n / 4
    }
}

impl Default for Quartile {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Quartile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

impl FromStr for Quartile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix(|c: char| c == 'Q' || c == 'q').unwrap_or(s);
        digits
            .parse::<u8>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| format!("Invalid quartile '{}'. Expected 1-4", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuartileGapPoint {
    pub date_key: String,
    pub date_label: String,
    /// Average over every present value on this date.
    pub total_avg: Option<f64>,
    /// Average over the selected quarter only.
    pub quartile_avg: Option<f64>,
    /// `quartile_avg - total_avg`, from unrounded averages.
    pub gap: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuartileGap {
    pub quartile: Quartile,
    pub points: Vec<QuartileGapPoint>,
    /// Gap of the most recent date that has one.
    pub latest_gap: Option<f64>,
}

/// How far one quarter of the students sits from everyone, per date.
///
/// Present values on a date are sorted ascending and cut by rank into four
/// slices `[⌊(q−1)n/4⌋, ⌊qn/4⌋)`. With fewer than four values some quarters
/// are empty and report `null`.
pub fn quartile_gap(records: &[Record], quartile: Quartile, metric: Metric) -> QuartileGap {
    let points: Vec<QuartileGapPoint> = unique_dates(records)
        .into_iter()
        .map(|date_key| {
            let mut values = valid_values(records.iter().filter(|r| r.date_key == date_key), metric);
            values.sort_by(f64::total_cmp);

            let total = average(&values);
            let slice = quartile.bounds(values.len());
            let quarter = average(&values[slice]);
            let gap = total.zip(quarter).map(|(t, q)| round1(q - t));

            QuartileGapPoint {
                date_label: format_date_short(&date_key),
                date_key,
                total_avg: total.map(round1),
                quartile_avg: quarter.map(round1),
                gap,
            }
        })
        .collect();

    let latest_gap = points.iter().rev().find_map(|p| p.gap);

    QuartileGap {
        quartile,
        points,
        latest_gap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::rec;

    #[test]
    fn test_one_point_per_date_with_nulls() {
        let records = vec![
            rec("2024-01", "Math", "6", 60.0),
            rec("2024-01", "Math", "6", 70.0),
            rec("2024-02", "English", "6", 50.0),
            rec("2024-03", "Science", "6", 0.0),
        ];

        let trend = trend_data(&records, Metric::ScaledScore);
        assert_eq!(trend.len(), 3);

        assert_eq!(trend[0].date_key, "2024-01");
        assert_eq!(trend[0].date_label, "Jan 24");
        assert_eq!(trend[0].values.math, Some(65.0));
        assert_eq!(trend[0].values.english, None);

        assert_eq!(trend[1].values.english, Some(50.0));
        assert_eq!(trend[2].values, SubjectValues::default());
    }

    #[test]
    fn test_trend_point_json_shape() {
        let records = vec![rec("Term 1", "Math", "6", 61.0)];
        let json = serde_json::to_value(&trend_data(&records, Metric::ScaledScore)[0]).unwrap();
        assert_eq!(json["dateKey"], "Term 1");
        assert_eq!(json["dateLabel"], "Term 1");
        assert_eq!(json["Math"], 61.0);
        assert!(json["Science"].is_null());
    }

    #[test]
    fn test_quartile_parse() {
        assert_eq!("2".parse::<Quartile>(), Ok(Quartile(2)));
        assert_eq!("Q4".parse::<Quartile>(), Ok(Quartile(4)));
        assert!("5".parse::<Quartile>().is_err());
        assert!("0".parse::<Quartile>().is_err());
        assert!(Quartile::new(0).is_none());
    }

    #[test]
    fn test_quartile_gap_bottom_and_top() {
        let records: Vec<Record> = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 0.0]
            .iter()
            .map(|v| rec("2024-01", "Math", "6", *v))
            .collect();

        let bottom = quartile_gap(&records, Quartile(1), Metric::ScaledScore);
        let point = &bottom.points[0];
        assert_eq!(point.total_avg, Some(45.0));
        assert_eq!(point.quartile_avg, Some(15.0));
        assert_eq!(point.gap, Some(-30.0));
        assert_eq!(bottom.latest_gap, Some(-30.0));

        let top = quartile_gap(&records, Quartile(4), Metric::ScaledScore);
        assert_eq!(top.points[0].quartile_avg, Some(75.0));
        assert_eq!(top.latest_gap, Some(30.0));
    }

    #[test]
    fn test_quartile_gap_sparse_dates() {
        let records = vec![
            rec("2024-01", "Math", "6", 40.0),
            rec("2024-01", "Math", "6", 60.0),
            rec("2024-01", "Math", "6", 80.0),
            rec("2024-01", "Math", "6", 100.0),
            rec("2024-02", "Math", "6", 50.0),
        ];

        let gap = quartile_gap(&records, Quartile(1), Metric::ScaledScore);
        assert_eq!(gap.points.len(), 2);
        assert_eq!(gap.points[0].gap, Some(-30.0));
        // A single value has no bottom quarter
        assert_eq!(gap.points[1].total_avg, Some(50.0));
        assert_eq!(gap.points[1].quartile_avg, None);
        assert_eq!(gap.points[1].gap, None);
        // Latest gap falls back to the last date that has one
        assert_eq!(gap.latest_gap, Some(-30.0));
    }
}
