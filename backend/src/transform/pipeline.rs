//! High-level ingestion API: workbook bytes to canonical records.
//!
//! This module combines the steps of the ingestion pipeline:
//! reading the workbook, locating `Raw Table`, and normalizing rows.
//!
//! Reading the file is the only await point. Once the bytes are in memory,
//! everything runs synchronously to completion.
//!
//! # Example
//!
//! ```rust,ignore
//! use scorecard::transform::pipeline::ingest_file;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ingested = ingest_file(Path::new("assessments.xlsx")).await?;
//!     println!("Loaded {} records", ingested.records.len());
//!     Ok(())
//! }
//! ```

use std::path::Path;

use super::normalizer::{normalize, IngestSummary};
use crate::api::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::error::IngestResult;
use crate::models::Record;
use crate::parser::read_raw_table;

/// Result of ingesting one workbook.
#[derive(Debug, Clone)]
pub struct Ingested {
    /// Canonical records in sheet row order.
    pub records: Vec<Record>,
    /// How the records were obtained.
    pub summary: IngestSummary,
}

/// Ingest a workbook file from disk.
pub async fn ingest_file(path: &Path) -> IngestResult<Ingested> {
    log_info(format!("📖 Reading {}...", path.display()));
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        log_error(format!("Could not read {}: {}", path.display(), e));
        e
    })?;
    ingest_bytes(bytes)
}

/// Ingest workbook bytes already in memory.
pub fn ingest_bytes(bytes: Vec<u8>) -> IngestResult<Ingested> {
    log_info(format!("Opening workbook ({} bytes)...", bytes.len()));

    let result = read_raw_table(bytes).and_then(|sheet| {
        log_success(format!("Found sheet \"{}\" with {} rows", sheet.name, sheet.rows.len()));
        normalize(&sheet)
    });

    let normalized = match result {
        Ok(n) => n,
        Err(e) => {
            log_error(e.to_string());
            return Err(e);
        }
    };

    print_summary(&normalized.summary);

    Ok(Ingested {
        records: normalized.records,
        summary: normalized.summary,
    })
}

fn print_summary(summary: &IngestSummary) {
    log_info(format!("📋 {} columns:", summary.headers.len()));
    for (i, col) in summary.headers.iter().enumerate().filter(|(_, c)| !c.is_empty()) {
        log_info_indent(format!("[{:2}] {}", i + 1, col), 1);
    }

    if summary.blank_rows > 0 {
        log_info(format!("{} blank rows skipped", summary.blank_rows));
    }
    if summary.missing_subject_rows > 0 {
        log_warning(format!(
            "{} rows skipped (no Subject)",
            summary.missing_subject_rows
        ));
    }
    log_success(format!(
        "{} records from {} data rows",
        summary.record_count, summary.data_rows
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_ingest_bytes_rejects_csv() {
        let err = ingest_bytes(b"Date,Subject,Scaled Score\n2024-01,Math,50".to_vec()).unwrap_err();
        assert_eq!(err.kind(), "io");
    }

    #[tokio::test]
    async fn test_ingest_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ingest_file(&dir.path().join("absent.xlsx")).await.unwrap_err();
        assert_eq!(err.kind(), "io");
        assert!(err.to_string().starts_with("Could not read the file"));
    }

    #[tokio::test]
    async fn test_ingest_garbage_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x00\x01\x02 definitely not a workbook").unwrap();
        let err = ingest_file(file.path()).await.unwrap_err();
        assert_eq!(err.kind(), "io");
    }
}
