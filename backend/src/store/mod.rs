//! Session store - persist the current record collection between runs.
//!
//! One fixed key, one file: `<data_dir>/edu-girls-data-v1.json` holds the
//! canonical record array exactly as serialized. Loads are checked against
//! the embedded record schema before anything is deserialized, so a
//! corrupt or hand-edited file is rejected as a whole.

use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::models::Record;
use crate::validation::validate_records;

/// Key the record array is stored under.
pub const STORE_KEY: &str = "edu-girls-data-v1";

/// Directory used when none is configured (relative to current dir)
pub const DEFAULT_DATA_DIR: &str = ".scorecard";

/// File-backed key-value store holding a single record array.
#[derive(Debug, Clone)]
pub struct SessionStore {
    data_dir: PathBuf,
}

impl SessionStore {
    /// Create a store rooted at a custom directory
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: PathBuf::from(dir.as_ref()),
        }
    }

    /// Location of the stored record array.
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", STORE_KEY))
    }

    /// Replace the stored records.
    pub fn save(&self, records: &[Record]) -> StoreResult<PathBuf> {
        fs::create_dir_all(&self.data_dir)?;

        let path = self.path();
        let content = serde_json::to_string(records)?;
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Read the stored records, `None` when nothing has been saved yet.
    pub fn load(&self) -> StoreResult<Option<Vec<Record>>> {
        let content = match fs::read_to_string(self.path()) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        parse_records(&content).map(Some)
    }

    /// Remove the stored records. Returns whether anything was removed.
    pub fn clear(&self) -> StoreResult<bool> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Validate a record array from a JSON file and store it.
    pub fn import(&self, path: &Path) -> StoreResult<Vec<Record>> {
        let content = fs::read_to_string(path)?;
        let records = parse_records(&content)?;
        self.save(&records)?;
        Ok(records)
    }
}

/// Parse and schema-check a serialized record array.
pub fn parse_records(content: &str) -> StoreResult<Vec<Record>> {
    let value: Value = serde_json::from_str(content)?;
    validate_records(&value).map_err(StoreError::Invalid)?;
    Ok(serde_json::from_value(value)?)
}
