//! Engine configuration
//!
//! All fields are optional in the JSON file; missing fields take defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{GridError, GridResult};
use crate::observability::Severity;
use crate::planner::CaseSensitivity;

/// Translation engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Relationship-traversal delimiter of the storage layer (default: "__")
    #[serde(default = "default_path_delimiter")]
    pub path_delimiter: String,

    /// Case policy for contains/startsWith/endsWith (default: insensitive)
    #[serde(default)]
    pub text_case: CaseSensitivity,

    /// Value of the `format` parameter that activates the engine (default: "aggrid")
    #[serde(default = "default_activation_format")]
    pub activation_format: String,

    /// Apply `distinct()` after the default filter predicate (default: true)
    #[serde(default = "default_distinct_after_filter")]
    pub distinct_after_filter: bool,

    /// Page size for standard (non-grid) requests (default: 100)
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Maximum page size for standard requests (default: 1000)
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Minimum severity written by the logger (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_path_delimiter() -> String {
    "__".to_string()
}

fn default_activation_format() -> String {
    "aggrid".to_string()
}

fn default_distinct_after_filter() -> bool {
    true
}

fn default_limit() -> usize {
    100
}

fn default_max_limit() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path_delimiter: default_path_delimiter(),
            text_case: CaseSensitivity::default(),
            activation_format: default_activation_format(),
            distinct_after_filter: default_distinct_after_filter(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            log_level: default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> GridResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| GridError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> GridResult<Self> {
        let config: EngineConfig = serde_json::from_str(content)
            .map_err(|e| GridError::Config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> GridResult<()> {
        if self.path_delimiter.is_empty() {
            return Err(GridError::Config("path_delimiter must not be empty".to_string()));
        }

        // Logical paths are split on '.', so the storage delimiter cannot contain it
        if self.path_delimiter.contains('.') {
            return Err(GridError::Config(format!(
                "Invalid path_delimiter: '{}'. It must not contain '.'",
                self.path_delimiter
            )));
        }

        if self.activation_format.trim().is_empty() {
            return Err(GridError::Config(
                "activation_format must not be empty".to_string(),
            ));
        }

        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(GridError::Config(format!(
                "default_limit must be between 1 and max_limit ({})",
                self.max_limit
            )));
        }

        self.min_severity()?;

        Ok(())
    }

    /// Minimum log severity; `None` disables logging
    pub fn min_severity(&self) -> GridResult<Option<Severity>> {
        match self.log_level.to_lowercase().as_str() {
            "off" => Ok(None),
            level => Severity::parse(level).map(Some).ok_or_else(|| {
                GridError::Config(format!("Invalid log_level: '{}'", self.log_level))
            }),
        }
    }
}
