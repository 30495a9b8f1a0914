//! CSV export of the tabular dashboard views.
//!
//! Trend, heatmap, ranking and records honour the school filter. The school
//! comparison is always computed over every school, like on the dashboard.
//! Missing averages are written as empty cells.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::aggregate::{
    class_heatmap, filter_by_school, school_comparison, top_bottom, trend_data, DashboardQuery,
    RankedCombo,
};
use crate::models::{Record, Subject, SubjectValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Trend,
    Heatmap,
    Ranking,
    Comparison,
    Records,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Trend,
        View::Heatmap,
        View::Ranking,
        View::Comparison,
        View::Records,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trend => "trend",
            Self::Heatmap => "heatmap",
            Self::Ranking => "ranking",
            Self::Comparison => "comparison",
            Self::Records => "records",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                format!("Unknown view '{}'. Expected one of: {}", s, names.join(", "))
            })
    }
}

fn subject_header() -> impl Iterator<Item = &'static str> {
    Subject::ALL.into_iter().map(|s| s.as_str())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn subject_cells(values: &SubjectValues) -> impl Iterator<Item = String> + '_ {
    values.iter().map(|(_, v)| cell(v))
}

/// Write one view as CSV.
pub fn write_view<W: Write>(
    writer: W,
    records: &[Record],
    view: View,
    query: &DashboardQuery,
) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let metric = query.metric;
    let filtered = filter_by_school(records, query.school_filter());

    match view {
        View::Trend => {
            wtr.write_record(["Date", "Label"].into_iter().chain(subject_header()))?;
            for point in trend_data(&filtered, metric) {
                let row = [point.date_key.clone(), point.date_label.clone()]
                    .into_iter()
                    .chain(subject_cells(&point.values));
                wtr.write_record(row)?;
            }
        }
        View::Heatmap => {
            wtr.write_record(["Class"].into_iter().chain(subject_header()))?;
            for row in class_heatmap(&filtered, metric).matrix {
                let cells = std::iter::once(row.class_name.clone()).chain(subject_cells(&row.values));
                wtr.write_record(cells)?;
            }
        }
        View::Ranking => {
            wtr.write_record(["List", "Rank", "Class", "Subject", metric.column_header(), "Count"])?;
            let ranking = top_bottom(&filtered, metric);
            write_ranked(&mut wtr, "top", &ranking.top)?;
            write_ranked(&mut wtr, "bottom", &ranking.bottom)?;
        }
        View::Comparison => {
            wtr.write_record(["School", "Full Name"].into_iter().chain(subject_header()))?;
            for row in school_comparison(records, metric) {
                let cells = [row.school.clone(), row.full_name.clone()]
                    .into_iter()
                    .chain(subject_cells(&row.values));
                wtr.write_record(cells)?;
            }
        }
        View::Records => {
            wtr.write_record([
                "School",
                "Date",
                "Subject",
                "S.no",
                "Name",
                "Score",
                "Scaled Score",
                "Percentile",
                "Section",
                "Class",
            ])?;
            for r in &filtered {
                wtr.write_record([
                    r.school.clone(),
                    r.date_key.clone(),
                    r.subject.clone(),
                    r.sno.clone(),
                    r.name.clone(),
                    r.score.to_string(),
                    r.scaled_score.to_string(),
                    r.percentile.to_string(),
                    r.section.clone(),
                    r.class_name.clone(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

fn write_ranked<W: Write>(
    wtr: &mut csv::Writer<W>,
    list: &str,
    combos: &[RankedCombo],
) -> csv::Result<()> {
    for (i, combo) in combos.iter().enumerate() {
        wtr.write_record([
            list.to_string(),
            (i + 1).to_string(),
            combo.class_name.clone(),
            combo.subject.to_string(),
            combo.avg_val.to_string(),
            combo.count.to_string(),
        ])?;
    }
    Ok(())
}

/// Render one view as a CSV string.
pub fn view_to_string(records: &[Record], view: View, query: &DashboardQuery) -> csv::Result<String> {
    let mut buf = Vec::new();
    write_view(&mut buf, records, view, query)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
