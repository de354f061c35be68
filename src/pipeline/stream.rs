//! Stream pipeline with explicit fan-out.
//!
//! The pipeline carries a sequence of items. Each stage runs as a *wave*:
//! it is applied to every current item, in order, before the next stage
//! starts. A stage emitting [`Emission::Many`] contributes each of its items
//! to the next wave, so all expansions of the first item precede those of
//! the second.
//!
//! A container given as the initial input is itself expanded into the
//! starting items; text and bytes are not.
//!
//! # Example
//!
//! ```rust
//! use pipewright::{keep, PipeStream, Value};
//!
//! let evens = PipeStream::with_input(vec![1, 2, 3, 4, 5, 6])
//!     .stage(keep(|v: &Value| v.as_int().is_some_and(|n| n % 2 == 0)));
//! assert_eq!(evens.run().unwrap(), Value::from(vec![2, 4, 6]).into_items().unwrap());
//! ```

use super::emission::Emission;
use super::pipe::Pipe;
use super::stack::StageStack;
use super::stage::{Stage, StageRef};
use super::timing::StageTiming;
use crate::config::PipelineConfig;
use crate::value::Value;
use std::fmt;
use std::ops::{Shr, ShrAssign};
use std::time::Instant;
use tracing::{debug_span, trace};

/// Pipeline carrying many items, expanding fan-out between stages.
#[derive(Clone, Default)]
pub struct PipeStream {
    stages: StageStack,
    input: Option<Emission>,
    config: PipelineConfig,
}

impl PipeStream {
    /// Empty pipeline whose `run()` yields an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty pipeline seeded with `input`.
    ///
    /// Lists and maps become one starting item per element; any other value
    /// becomes a single starting item. `Null` seeds an empty stream.
    pub fn with_input(input: impl Into<Value>) -> Self {
        Self {
            input: seed(input.into()),
            ..Self::default()
        }
    }

    /// Build a stream pipeline over the stages of `pipe`.
    ///
    /// The stage list is copied; the stages themselves are shared. Stages
    /// appended to either pipeline afterwards do not show up in the other.
    pub fn from_pipe(pipe: &Pipe, input: impl Into<Value>) -> Self {
        Self {
            stages: pipe.stages().clone(),
            input: seed(input.into()),
            config: *pipe.config(),
        }
    }

    /// Replace the reporting configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a stage, consuming and returning the pipeline.
    pub fn stage<S: Stage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(stage);
        self
    }

    /// Append a stage in place.
    pub fn push<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(stage);
        self
    }

    /// Append an already shared stage in place.
    pub fn push_ref(&mut self, stage: StageRef) -> &mut Self {
        self.stages.push_ref(stage);
        self
    }

    /// Apply `f` only when `condition` holds.
    pub fn when<F>(self, condition: bool, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        if condition {
            f(self)
        } else {
            self
        }
    }

    /// Stages in application order.
    pub fn stages(&self) -> &StageStack {
        &self.stages
    }

    /// Reporting configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True when no stage has been appended.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Display names of the stages, in order.
    pub fn stage_names(&self) -> Vec<String> {
        self.stages.names()
    }

    /// Run from the stored input.
    pub fn run(&self) -> anyhow::Result<Vec<Value>> {
        self.invoke(None)
    }

    /// Run from `input`, normalized the same way as at construction.
    ///
    /// A `Null` input counts as omitted and falls back to the stored input.
    pub fn run_with(&self, input: impl Into<Value>) -> anyhow::Result<Vec<Value>> {
        self.invoke(Some(input.into()))
    }

    /// Run from `input`, or from the stored input when `None` or `Null`.
    ///
    /// A stage error aborts the current wave: the remaining items and stages
    /// are not processed and the error is returned unchanged.
    pub fn invoke(&self, input: Option<Value>) -> anyhow::Result<Vec<Value>> {
        self.execute(input, None)
    }

    /// Like [`invoke`](Self::invoke), also reporting per-wave timings.
    pub fn run_with_timing(
        &self,
        input: Option<Value>,
    ) -> anyhow::Result<(Vec<Value>, Vec<StageTiming>)> {
        let mut timings = Vec::with_capacity(self.stages.len());
        let items = self.execute(input, Some(&mut timings))?;
        Ok((items, timings))
    }

    /// Iterate the results of [`run`](Self::run).
    ///
    /// A failed run yields its error once and then ends.
    pub fn iter(&self) -> StreamIter {
        match self.run() {
            Ok(items) => StreamIter {
                items: items.into_iter(),
                error: None,
            },
            Err(err) => StreamIter {
                items: Vec::new().into_iter(),
                error: Some(err),
            },
        }
    }

    fn execute(
        &self,
        input: Option<Value>,
        mut timings: Option<&mut Vec<StageTiming>>,
    ) -> anyhow::Result<Vec<Value>> {
        let start_items = match input.filter(|v| !v.is_null()) {
            Some(value) => seed(value),
            None => self.input.clone(),
        };
        let Some(start_items) = start_items else {
            return Ok(Vec::new());
        };

        let mut stream = Vec::with_capacity(start_items.width());
        start_items.flatten_into(&mut stream);

        let span = debug_span!("pipe_stream", stages = self.stages.len(), items = stream.len());
        let _enter = span.enter();
        self.stages.report_start(&self.config);

        for (i, stage) in self.stages.iter().enumerate() {
            self.stages.report_stage(&self.config, i, stage);
            let _wave = debug_span!("wave", stage = %stage.name()).entered();
            let start = Instant::now();
            let items_in = stream.len();

            let mut next = Vec::with_capacity(items_in);
            for item in stream {
                stage.apply(item)?.flatten_into(&mut next);
            }
            trace!(stage = %stage.name(), items_in, items_out = next.len(), "wave complete");

            if let Some(timings) = timings.as_deref_mut() {
                timings.push(StageTiming {
                    name: stage.name().into_owned(),
                    duration: start.elapsed(),
                    items_in,
                    items_out: next.len(),
                });
            }
            stream = next;
        }
        Ok(stream)
    }
}

/// Normalize an input into the starting items, `None` for an empty stream.
fn seed(input: Value) -> Option<Emission> {
    if input.is_null() {
        None
    } else {
        Some(Emission::spread(input))
    }
}

/// Iterator over the results of a stream run.
pub struct StreamIter {
    items: std::vec::IntoIter<Value>,
    error: Option<anyhow::Error>,
}

impl Iterator for StreamIter {
    type Item = anyhow::Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.error.take() {
            return Some(Err(err));
        }
        self.items.next().map(Ok)
    }
}

impl<'a> IntoIterator for &'a PipeStream {
    type Item = anyhow::Result<Value>;
    type IntoIter = StreamIter;

    fn into_iter(self) -> StreamIter {
        self.iter()
    }
}

impl<S: Stage + 'static> Shr<S> for PipeStream {
    type Output = PipeStream;

    fn shr(self, stage: S) -> PipeStream {
        self.stage(stage)
    }
}

impl<S: Stage + 'static> ShrAssign<S> for PipeStream {
    fn shr_assign(&mut self, stage: S) {
        self.stages.push(stage);
    }
}

impl fmt::Display for PipeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PipeStream({})", self.stages)
    }
}

impl fmt::Debug for PipeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeStream")
            .field("stages", &self.stages)
            .field("input", &self.input)
            .finish()
    }
}
