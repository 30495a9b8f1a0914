//! Transformation module.
//!
//! This module turns uploaded workbooks into canonical records:
//! - Normalizer: `Raw Table` rows to canonical records
//! - Pipeline: async entry points with progress logging

pub mod normalizer;
pub mod pipeline;

pub use normalizer::{normalize, normalize_rows, IngestSummary, Normalized};
pub use pipeline::*;
