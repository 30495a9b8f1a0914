//! Every view for one metric and school selection, computed in one pass.

use serde::{Deserialize, Serialize};

use super::{
    class_heatmap, filter_by_school, header_stats, school_comparison, subject_stats, top_bottom,
    trend_data, unique_schools, ClassHeatmap, HeaderStats, Ranking, SchoolRow, StyledRow,
    SubjectStat, TrendPoint,
};
use crate::models::{Metric, Record};

/// Comparison needs at least this many schools.
const MIN_COMPARISON_SCHOOLS: usize = 2;

/// View parameters held by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    #[serde(default)]
    pub metric: Metric,
    /// `None` or an empty string selects every school.
    #[serde(default)]
    pub school: Option<String>,
}

impl DashboardQuery {
    pub fn new(metric: Metric, school: Option<String>) -> Self {
        Self { metric, school }
    }

    /// The school filter, treating blank as unset.
    pub fn school_filter(&self) -> Option<&str> {
        self.school.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub metric: Metric,
    pub metric_label: &'static str,
    pub selected_school: Option<String>,
    /// Every school in the full record set.
    pub schools: Vec<String>,
    pub header: HeaderStats,
    pub subjects: Vec<SubjectStat>,
    pub trend: Vec<TrendPoint>,
    pub heatmap: ClassHeatmap,
    pub heatmap_styles: Vec<StyledRow>,
    pub ranking: Ranking,
    /// Only present with two or more schools; ignores the school filter.
    pub comparison: Option<Vec<SchoolRow>>,
}

impl Dashboard {
    pub fn build(records: &[Record], query: &DashboardQuery) -> Self {
        let metric = query.metric;
        let school = query.school_filter();
        let schools = unique_schools(records);
        let filtered = filter_by_school(records, school);

        let heatmap = class_heatmap(&filtered, metric);
        let heatmap_styles = heatmap.styled();

        let comparison = (schools.len() >= MIN_COMPARISON_SCHOOLS)
            .then(|| school_comparison(records, metric));

        Self {
            metric,
            metric_label: metric.label(),
            selected_school: school.map(String::from),
            header: header_stats(&filtered),
            subjects: subject_stats(&filtered, metric),
            trend: trend_data(&filtered, metric),
            heatmap,
            heatmap_styles,
            ranking: top_bottom(&filtered, metric),
            comparison,
            schools,
        }
    }
}
