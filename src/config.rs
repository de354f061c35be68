//! Pipeline configuration.
//!
//! Configuration only affects reporting; it never changes what a pipeline
//! computes. It can come from a TOML file, from the environment, or both:
//!
//! ```toml
//! progress = true
//! quiet = false
//! ```
//!
//! Environment overrides: `PIPEWRIGHT_PROGRESS` and `PIPEWRIGHT_QUIET`
//! (`"true"` or `"1"` enable, anything else disables).

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable enabling per-stage progress lines.
pub const PROGRESS_ENV: &str = "PIPEWRIGHT_PROGRESS";

/// Environment variable silencing progress lines even when enabled.
pub const QUIET_ENV: &str = "PIPEWRIGHT_QUIET";

/// Reporting options carried by a pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Log a line per stage at `info` level.
    pub progress: bool,

    /// Suppress progress lines.
    pub quiet: bool,
}

impl PipelineConfig {
    /// Config with progress reporting enabled.
    pub fn with_progress() -> Self {
        Self {
            progress: true,
            quiet: false,
        }
    }

    /// Whether progress lines should be emitted.
    pub fn reports_progress(&self) -> bool {
        self.progress && !self.quiet
    }

    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str::<PipelineConfig>(contents)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    /// Config built from the process environment alone.
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Apply environment overrides on top of this config.
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn merge_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(PROGRESS_ENV) {
            self.progress = parse_flag(&value);
        }
        if let Some(value) = lookup(QUIET_ENV) {
            self.quiet = parse_flag(&value);
        }
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}
