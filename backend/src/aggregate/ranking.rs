//! Best and worst class/subject combinations.

use serde::Serialize;

use super::heatmap::distinct_classes;
use super::{average, round1, valid_values};
use crate::models::{Metric, Record, Subject};

/// Maximum entries in each of the top and bottom lists.
pub const RANKING_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCombo {
    #[serde(rename = "class")]
    pub class_name: String,
    pub subject: Subject,
    pub avg_val: f64,
    /// Present values behind the average.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Ranking {
    /// Highest averages first.
    pub top: Vec<RankedCombo>,
    /// Lowest averages first.
    pub bottom: Vec<RankedCombo>,
}

/// Rank every class × subject combination that has at least one value.
///
/// Ties keep discovery order: classes as first seen, subjects in fixed order.
pub fn top_bottom(records: &[Record], metric: Metric) -> Ranking {
    let mut combos = Vec::new();

    for class_name in distinct_classes(records) {
        for subject in Subject::ALL {
            let values = valid_values(
                records
                    .iter()
                    .filter(|r| r.class_name == class_name && subject.matches(r)),
                metric,
            );
            if let Some(avg) = average(&values) {
                combos.push(RankedCombo {
                    class_name: class_name.clone(),
                    subject,
                    avg_val: round1(avg),
                    count: values.len(),
                });
            }
        }
    }

    let mut top = combos.clone();
    top.sort_by(|a, b| b.avg_val.total_cmp(&a.avg_val));
    top.truncate(RANKING_SIZE);

    let mut bottom = combos;
    bottom.sort_by(|a, b| a.avg_val.total_cmp(&b.avg_val));
    bottom.truncate(RANKING_SIZE);

    Ranking { top, bottom }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::rec;

    fn sample() -> Vec<Record> {
        let mut records = Vec::new();
        for (i, class) in ["6", "7", "8"].iter().enumerate() {
            let base = 40.0 + i as f64 * 10.0;
            records.push(rec("2024-01", "Math", class, base));
            records.push(rec("2024-01", "English", class, base + 2.0));
            records.push(rec("2024-01", "Science", class, base + 4.0));
        }
        records
    }

    #[test]
    fn test_sizes_and_order() {
        let ranking = top_bottom(&sample(), Metric::ScaledScore);

        assert_eq!(ranking.top.len(), RANKING_SIZE);
        assert_eq!(ranking.bottom.len(), RANKING_SIZE);
        assert!(ranking.top.windows(2).all(|w| w[0].avg_val >= w[1].avg_val));
        assert!(ranking.bottom.windows(2).all(|w| w[0].avg_val <= w[1].avg_val));

        assert_eq!(ranking.top[0].class_name, "8");
        assert_eq!(ranking.top[0].subject, Subject::Science);
        assert_eq!(ranking.top[0].avg_val, 64.0);
        assert_eq!(ranking.bottom[0].class_name, "6");
        assert_eq!(ranking.bottom[0].subject, Subject::Math);
    }

    #[test]
    fn test_single_sample_is_eligible() {
        let records = vec![
            rec("2024-01", "Math", "6", 50.0),
            rec("2024-01", "Math", "6", 0.0),
            rec("2024-01", "English", "6", 0.0),
        ];
        let ranking = top_bottom(&records, Metric::ScaledScore);
        assert_eq!(ranking.top.len(), 1);
        assert_eq!(ranking.top[0].count, 1);
        assert_eq!(ranking.top, ranking.bottom);
    }

    #[test]
    fn test_classless_records_ignored() {
        let ranking = top_bottom(&[rec("2024-01", "Math", "", 50.0)], Metric::ScaledScore);
        assert!(ranking.top.is_empty());
        assert!(ranking.bottom.is_empty());
    }

    #[test]
    fn test_combo_json_shape() {
        let ranking = top_bottom(&[rec("2024-01", "Math", "6", 50.0)], Metric::ScaledScore);
        let json = serde_json::to_value(&ranking.top[0]).unwrap();
        assert_eq!(json["class"], "6");
        assert_eq!(json["subject"], "Math");
        assert_eq!(json["avgVal"], 50.0);
        assert_eq!(json["count"], 1);
    }
}
