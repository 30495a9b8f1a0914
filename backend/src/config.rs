//! Server configuration from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `SCORECARD_PORT` | `3000` |
//! | `SCORECARD_DATA_DIR` | `.scorecard` |
//! | `SCORECARD_STATIC_DIR` | unset |
//! | `SCORECARD_MAX_UPLOAD_MB` | `50` |
//!
//! A `.env` file in the working directory is loaded first. Values that fail
//! to parse fall back to the default with a warning.

use std::path::PathBuf;
use std::str::FromStr;

use crate::api::logs::log_warning;
use crate::store::DEFAULT_DATA_DIR;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Where the session store keeps its file.
    pub data_dir: PathBuf,
    /// Directory of a built frontend, served for unmatched paths.
    pub static_dir: Option<PathBuf>,
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            static_dir: None,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

impl ServerConfig {
    /// Read `.env` and the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            port: parsed(value("SCORECARD_PORT"), "SCORECARD_PORT", defaults.port),
            data_dir: value("SCORECARD_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            static_dir: value("SCORECARD_STATIC_DIR").map(PathBuf::from),
            max_upload_mb: parsed(
                value("SCORECARD_MAX_UPLOAD_MB"),
                "SCORECARD_MAX_UPLOAD_MB",
                defaults.max_upload_mb,
            ),
        }
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, port: Option<u16>, data_dir: Option<PathBuf>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn parsed<T: FromStr>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log_warning(format!("Ignoring invalid {}={}", key, raw));
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 3000);
        assert_eq!(config.data_dir, PathBuf::from(".scorecard"));
        assert_eq!(config.max_upload_bytes(), 50 * 1024 * 1024);
    }

    #[test]
    fn test_env_values() {
        let config = config(&[
            ("SCORECARD_PORT", "8080"),
            ("SCORECARD_DATA_DIR", "/var/lib/scorecard"),
            ("SCORECARD_STATIC_DIR", "dist"),
            ("SCORECARD_MAX_UPLOAD_MB", "5"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/scorecard"));
        assert_eq!(config.static_dir, Some(PathBuf::from("dist")));
        assert_eq!(config.max_upload_mb, 5);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[("SCORECARD_PORT", "http"), ("SCORECARD_STATIC_DIR", "  ")]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.static_dir, None);
    }

    #[test]
    fn test_cli_overrides() {
        let config = config(&[("SCORECARD_PORT", "8080")]).with_overrides(Some(9000), None);
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_dir, PathBuf::from(".scorecard"));
    }
}
