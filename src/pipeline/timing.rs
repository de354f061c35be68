//! Per-stage timing collected by `run_with_timing`.

use std::time::Duration;

/// Timing information for one pipeline stage.
#[derive(Debug, Clone)]
pub struct StageTiming {
    /// Name of the stage
    pub name: String,

    /// Time taken to execute the stage (the whole wave, for streams)
    pub duration: Duration,

    /// Items handed to the stage
    pub items_in: usize,

    /// Items produced by the stage after fan-out
    pub items_out: usize,
}

impl StageTiming {
    /// Format the timing as a human-readable string.
    pub fn format(&self) -> String {
        format!(
            "{}: {:.2}s ({} -> {} items)",
            self.name,
            self.duration.as_secs_f64(),
            self.items_in,
            self.items_out
        )
    }
}
