//! REST API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::aggregate::{DashboardQuery, Quartile};
use crate::models::Metric;
use crate::transform::{IngestSummary, Ingested};

/// Response sent after a workbook upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub job_id: String,
    /// "ready", or "warning" when rows were skipped
    pub status: String,
    pub file_name: Option<String>,
    pub record_count: usize,
    pub schools: Vec<String>,
    pub summary: IngestSummary,
    /// Whether the records were written to the session store.
    pub persisted: bool,
}

impl UploadResponse {
    pub fn new(ingested: &Ingested, file_name: Option<String>, persisted: bool) -> Self {
        let summary = ingested.summary.clone();
        let status = if summary.missing_subject_rows == 0 {
            "ready"
        } else {
            "warning"
        };

        Self {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            file_name,
            record_count: ingested.records.len(),
            schools: crate::aggregate::unique_schools(&ingested.records),
            summary,
            persisted,
        }
    }
}

/// Query string of `/api/dashboard`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardParams {
    pub metric: Option<String>,
    pub school: Option<String>,
}

impl DashboardParams {
    pub fn into_query(self) -> Result<DashboardQuery, String> {
        Ok(DashboardQuery::new(parse_metric(self.metric)?, self.school))
    }
}

/// Query string of `/api/quartile-gap`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuartileGapParams {
    pub metric: Option<String>,
    pub school: Option<String>,
    pub quartile: Option<String>,
}

impl QuartileGapParams {
    pub fn into_parts(self) -> Result<(DashboardQuery, Quartile), String> {
        let quartile = match self.quartile.as_deref().filter(|q| !q.trim().is_empty()) {
            Some(q) => q.parse()?,
            None => Quartile::default(),
        };
        Ok((DashboardQuery::new(parse_metric(self.metric)?, self.school), quartile))
    }
}

fn parse_metric(metric: Option<String>) -> Result<Metric, String> {
    match metric.as_deref().filter(|m| !m.trim().is_empty()) {
        Some(m) => m.parse(),
        None => Ok(Metric::default()),
    }
}

/// Error body shared by every endpoint.
pub fn error_response(kind: &str, error: &str) -> Value {
    json!({
        "status": "error",
        "kind": kind,
        "error": error,
    })
}
