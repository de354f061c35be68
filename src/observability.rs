//! Logging setup.
//!
//! The library emits `tracing` spans and events for every invocation and
//! `log` records for progress lines. Applications that have no subscriber of
//! their own can call [`init_logging`] once at startup:
//!
//! ```ignore
//! use pipewright::observability::init_logging;
//!
//! fn main() {
//!     init_logging("pipewright=debug");
//!     // ... build and run pipelines
//! }
//! ```

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`, or by `default_filter`
/// when `RUST_LOG` is unset or invalid.
///
/// `log` records are forwarded to the same subscriber. Returns `false` when a
/// global subscriber was already installed, in which case nothing changes.
pub fn init_logging(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
