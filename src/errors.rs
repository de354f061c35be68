//! Error types for pipewright.
//!
//! Stage failures are plain [`anyhow::Error`] values: whatever a stage,
//! predicate or effect returns as its error travels back to the caller of
//! `run` untouched, so it can be inspected with `downcast_ref` exactly as if
//! the stage had been called directly.
//!
//! The types in this module are the few errors the library itself defines:
//!
//! - [`ValueError`]: raised by the `try_*` accessors on [`Value`](crate::Value),
//!   intended for stage authors who want `?` inside a stage body
//! - [`ConfigError`]: reading or parsing a [`PipelineConfig`](crate::PipelineConfig)
//!
//! # Example
//!
//! ```rust
//! use pipewright::{Pipe, Value, ValueError};
//!
//! fn double(v: Value) -> anyhow::Result<Value> {
//!     Ok(Value::from(v.try_int()? * 2))
//! }
//!
//! let pipe = Pipe::new().stage(double);
//! let err = pipe.run_with("oops").unwrap_err();
//! assert!(matches!(
//!     err.downcast_ref::<ValueError>(),
//!     Some(ValueError::TypeMismatch { expected: "int", .. })
//! ));
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result produced by applying a stage to one value.
pub type StageResult = anyhow::Result<crate::Emission>;

/// Errors raised when a [`Value`](crate::Value) does not hold the expected variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The value has a different runtime kind than the caller asked for.
    #[error("expected {expected} value, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl ValueError {
    /// Create a type mismatch error.
    pub fn mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }
}

/// Errors raised while loading pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for [`PipelineConfig`](crate::PipelineConfig).
    #[error("Failed to parse pipeline config: {0}")]
    Parse(#[from] toml::de::Error),
}
