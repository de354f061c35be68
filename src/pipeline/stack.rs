//! Ordered, append-only stage list shared by both pipeline flavors.

use super::stage::{Stage, StageRef};
use crate::config::PipelineConfig;
use std::fmt;
use std::sync::Arc;

/// Ordered list of stages.
///
/// Backed by a persistent vector: cloning a stack is O(1) and the clone
/// shares every stage with the original. Appending to one never affects the
/// other.
#[derive(Clone, Default)]
pub struct StageStack {
    stages: im::Vector<StageRef>,
}

impl StageStack {
    /// Empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `stage`, taking ownership.
    pub fn push<S: Stage + 'static>(&mut self, stage: S) {
        self.stages.push_back(Arc::new(stage));
    }

    /// Append a stage that may be shared with other stacks.
    pub fn push_ref(&mut self, stage: StageRef) {
        self.stages.push_back(stage);
    }

    /// Stages in application order.
    pub fn iter(&self) -> impl Iterator<Item = &StageRef> + '_ {
        self.stages.iter()
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True when no stage has been appended.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Display name of each stage, in order.
    pub fn names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.name().into_owned()).collect()
    }

    pub(crate) fn report_start(&self, config: &PipelineConfig) {
        if config.reports_progress() {
            log::info!("Pipeline: {} stages", self.stages.len());
        }
    }

    pub(crate) fn report_stage(&self, config: &PipelineConfig, index: usize, stage: &StageRef) {
        if config.reports_progress() {
            log::info!(
                "Stage {}/{}: {}",
                index + 1,
                self.stages.len(),
                stage.name()
            );
        }
    }
}

impl fmt::Display for StageStack {
    /// Stage names joined by ` >> `.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                write!(f, " >> ")?;
            }
            write!(f, "{}", stage.name())?;
        }
        Ok(())
    }
}

impl fmt::Debug for StageStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
