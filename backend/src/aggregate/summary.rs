//! Header summary and per-subject cards.

use serde::Serialize;
use std::collections::HashSet;

use super::{metric_average, round1, rounded_average, unique_dates};
use crate::models::{Metric, Record, Subject};
use crate::parser::{format_date_full, UNKNOWN_DATE};

/// Dashboard header figures, always on the latest date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderStats {
    pub latest_date: String,
    pub latest_date_display: String,
    /// Distinct students on the latest date.
    pub total_students: usize,
    pub avg_scaled_score: Option<f64>,
    pub avg_percentile: Option<f64>,
    /// All records, every date.
    pub total_records: usize,
}

/// Movement of a subject between the two latest dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    pub fn classify(delta: f64, threshold: f64) -> Self {
        if delta > threshold {
            Self::Up
        } else if delta < -threshold {
            Self::Down
        } else {
            Self::Neutral
        }
    }
}

/// One subject card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStat {
    pub subject: Subject,
    pub avg_scaled: Option<f64>,
    pub avg_percentile: Option<f64>,
    /// Change of the active metric since the previous date.
    pub delta: Option<f64>,
    /// `None` when there is no comparable previous period.
    pub direction: Option<Direction>,
    /// Records on the latest date, including ones with missing values.
    pub count: usize,
}

pub fn header_stats(records: &[Record]) -> HeaderStats {
    let latest_date = unique_dates(records)
        .pop()
        .unwrap_or_else(|| UNKNOWN_DATE.to_string());
    let latest: Vec<&Record> = records.iter().filter(|r| r.date_key == latest_date).collect();

    let total_students = latest
        .iter()
        .map(|r| r.student_key())
        .filter(|k| !k.is_empty())
        .collect::<HashSet<_>>()
        .len();

    HeaderStats {
        latest_date_display: format_date_full(&latest_date),
        total_students,
        avg_scaled_score: rounded_average(latest.iter().copied(), Metric::ScaledScore),
        avg_percentile: rounded_average(latest.iter().copied(), Metric::Percentile),
        total_records: records.len(),
        latest_date,
    }
}

pub fn subject_stats(records: &[Record], metric: Metric) -> Vec<SubjectStat> {
    let dates = unique_dates(records);
    let latest_date = dates.last();
    let prev_date = dates.len().checked_sub(2).map(|i| &dates[i]);

    Subject::ALL
        .into_iter()
        .map(|subject| {
            let on_date = |date: Option<&String>| -> Vec<&Record> {
                records
                    .iter()
                    .filter(|r| Some(&r.date_key) == date && subject.matches(r))
                    .collect()
            };
            let latest_rows = on_date(latest_date);

            let delta = prev_date.and_then(|_| {
                let prev_rows = on_date(prev_date);
                let current = metric_average(latest_rows.iter().copied(), metric)?;
                let previous = metric_average(prev_rows.iter().copied(), metric)?;
                Some(round1(current - previous))
            });

            SubjectStat {
                subject,
                avg_scaled: rounded_average(latest_rows.iter().copied(), Metric::ScaledScore),
                avg_percentile: rounded_average(latest_rows.iter().copied(), Metric::Percentile),
                delta,
                direction: delta.map(|d| Direction::classify(d, metric.delta_threshold())),
                count: latest_rows.len(),
            }
        })
        .collect()
}
