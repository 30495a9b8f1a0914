//! # Scorecard - student assessment ingestion and dashboard aggregation
//!
//! Scorecard reads assessment workbooks (a `Raw Table` sheet of one row per
//! student, subject and test date), normalizes them into canonical records
//! and derives every dashboard view from those records.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Workbook   │────▶│   Parser    │────▶│  Normalizer │────▶│  Canonical  │
//! │ (xlsx/xls/  │     │ (Raw Table, │     │ (columns,   │     │   records   │
//! │  ods bytes) │     │  cells)     │     │  date keys) │     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                     ┌─────────────┐     ┌─────────────┐            │
//!                     │  Dashboard  │◀────│ Aggregation │◀───────────┘
//!                     │ JSON / CSV  │     │  (+palette) │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scorecard::{ingest_file, Dashboard, DashboardQuery, Metric};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ingested = ingest_file(Path::new("assessments.xlsx")).await?;
//!     let query = DashboardQuery::new(Metric::Percentile, None);
//!     let dashboard = Dashboard::build(&ingested.records, &query);
//!     println!("{}", serde_json::to_string_pretty(&dashboard)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Cells, canonical records, metrics and subjects
//! - [`parser`] - Workbook reading, numeric coercion and date keys
//! - [`transform`] - Normalization and the ingestion pipeline
//! - [`aggregate`] - Dashboard views
//! - [`palette`] - Heatmap colour buckets
//! - [`export`] - CSV export of tabular views
//! - [`validation`] - JSON Schema checks for stored records
//! - [`store`] - Session persistence
//! - [`config`] - Server configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Views
pub mod aggregate;
pub mod export;
pub mod palette;

// Persistence
pub mod store;
pub mod validation;

// HTTP API
pub mod api;
pub mod config;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{IngestError, IngestResult, ServerError, ServerResult, StoreError, StoreResult};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CellValue, Metric, Record, Subject, SubjectValues};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    format_date_full, format_date_short, parse_number, read_raw_table, resolve_date_key, RawSheet,
    RAW_TABLE_SHEET, UNKNOWN_DATE,
};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{ingest_bytes, ingest_file, normalize, normalize_rows, IngestSummary, Ingested};

// =============================================================================
// Re-exports - Aggregation
// =============================================================================

pub use aggregate::{
    class_heatmap, header_stats, quartile_gap, round1, school_comparison, subject_stats,
    top_bottom, trend_data, unique_dates, unique_schools, ClassHeatmap, Dashboard,
    DashboardQuery, Direction, HeaderStats, Quartile, QuartileGap, Ranking, SchoolRow,
    SubjectStat, TrendPoint,
};
pub use palette::{bucket_for, cell_style, Bucket, CellStyle};

// =============================================================================
// Re-exports - Export, persistence, server
// =============================================================================

pub use config::ServerConfig;
pub use export::{view_to_string, write_view, View};
pub use store::{SessionStore, STORE_KEY};
pub use validation::validate_records;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}
