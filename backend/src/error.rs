//! Error types for the Scorecard ingestion pipeline.
//!
//! This module defines the error hierarchy used across the crate:
//!
//! - [`IngestError`] - Workbook reading and record normalization errors
//! - [`StoreError`] - Session store errors
//! - [`ServerError`] - HTTP layer errors
//!
//! The aggregation engine and the palette never fail, so they have no
//! error type. Conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Ingestion Errors
// =============================================================================

/// Errors raised while turning an uploaded workbook into canonical records.
///
/// Every variant carries a human-readable message describing what was
/// found versus what was expected. None of them are retried internally.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Required sheet or required column is absent.
    #[error("{0}")]
    Schema(String),

    /// The sheet has fewer than two rows (headers + data).
    #[error("{0}")]
    Shape(String),

    /// No valid record survived normalization.
    #[error("{0}")]
    Data(String),

    /// The underlying bytes could not be read or are not a workbook.
    #[error("{0}")]
    Io(String),
}

impl IngestError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Schema(_) => "schema",
            Self::Shape(_) => "shape",
            Self::Data(_) => "data",
            Self::Io(_) => "io",
        }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(format!("Could not read the file: {}", e))
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors from the session store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored content does not match the canonical record schema.
    #[error("Stored records are invalid: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Ingestion error.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Nothing uploaded yet.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ServerError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ingest(e) => e.kind(),
            Self::Store(_) => "store",
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // IngestError -> ServerError keeps the message untouched
        let ingest = IngestError::Schema("Column \"Subject\" not found".into());
        let server: ServerError = ingest.into();
        assert_eq!(server.kind(), "schema");
        assert!(server.to_string().contains("Subject"));

        // std::io::Error -> IngestError
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let ingest: IngestError = io.into();
        assert_eq!(ingest.kind(), "io");
        assert!(ingest.to_string().starts_with("Could not read the file"));
    }

    #[test]
    fn test_invalid_store_message() {
        let err = StoreError::Invalid(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Stored records are invalid: a; b");
    }
}
