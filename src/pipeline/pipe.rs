//! Single-value pipeline.
//!
//! Each stage receives the previous stage's whole result. A fan-out emitted
//! by a stage is collapsed into one list value rather than expanded.
//!
//! # Example
//!
//! ```rust
//! use pipewright::{Pipe, Value};
//!
//! fn upper(v: Value) -> anyhow::Result<Value> {
//!     Ok(Value::from(v.try_str()?.to_uppercase()))
//! }
//!
//! fn reverse(v: Value) -> anyhow::Result<Value> {
//!     Ok(Value::from(v.try_str()?.chars().rev().collect::<String>()))
//! }
//!
//! let pipe = Pipe::with_input("hello") >> upper >> reverse;
//! assert_eq!(pipe.run().unwrap(), Value::from("OLLEH"));
//! assert_eq!(pipe.run_with("abc").unwrap(), Value::from("CBA"));
//! ```

use super::stack::StageStack;
use super::stage::{Stage, StageRef};
use super::timing::StageTiming;
use crate::config::PipelineConfig;
use crate::value::Value;
use std::fmt;
use std::ops::{Shr, ShrAssign};
use std::time::Instant;
use tracing::{debug_span, trace};

/// Pipeline threading one value through its stages.
///
/// Invocations never mutate the pipeline; the same pipeline can be run any
/// number of times.
#[derive(Clone, Default)]
pub struct Pipe {
    stages: StageStack,
    input: Value,
    config: PipelineConfig,
}

impl Pipe {
    /// Empty pipeline with no default input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty pipeline whose `run()` starts from `input`.
    pub fn with_input(input: impl Into<Value>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
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
    ///
    /// ```rust
    /// use pipewright::{Pipe, Value};
    ///
    /// fn inc(v: Value) -> Value { Value::Int(v.as_int().unwrap_or(0) + 1) }
    ///
    /// let verbose = false;
    /// let pipe = Pipe::with_input(1).stage(inc).when(verbose, |p| p.stage(inc));
    /// assert_eq!(pipe.len(), 1);
    /// ```
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

    /// Default input used when none is supplied.
    pub fn input(&self) -> &Value {
        &self.input
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

    /// Run from the default input.
    pub fn run(&self) -> anyhow::Result<Value> {
        self.invoke(None)
    }

    /// Run from `input` instead of the default.
    ///
    /// A `Null` input counts as omitted and falls back to the default.
    pub fn run_with(&self, input: impl Into<Value>) -> anyhow::Result<Value> {
        self.invoke(Some(input.into()))
    }

    /// Run from `input`, or from the default input when `None` or `Null`.
    ///
    /// The first stage error aborts the run and is returned unchanged.
    pub fn invoke(&self, input: Option<Value>) -> anyhow::Result<Value> {
        self.execute(input, None)
    }

    /// Like [`invoke`](Self::invoke), also reporting how long each stage took.
    pub fn run_with_timing(
        &self,
        input: Option<Value>,
    ) -> anyhow::Result<(Value, Vec<StageTiming>)> {
        let mut timings = Vec::with_capacity(self.stages.len());
        let value = self.execute(input, Some(&mut timings))?;
        Ok((value, timings))
    }

    fn execute(
        &self,
        input: Option<Value>,
        mut timings: Option<&mut Vec<StageTiming>>,
    ) -> anyhow::Result<Value> {
        let span = debug_span!("pipe", stages = self.stages.len());
        let _enter = span.enter();
        self.stages.report_start(&self.config);

        let mut data = input
            .filter(|v| !v.is_null())
            .unwrap_or_else(|| self.input.clone());
        for (i, stage) in self.stages.iter().enumerate() {
            self.stages.report_stage(&self.config, i, stage);
            let _stage = debug_span!("stage", name = %stage.name()).entered();
            let start = Instant::now();

            let emission = stage.apply(data)?;
            trace!(stage = %stage.name(), width = emission.width(), "stage applied");
            data = emission.collapse();

            if let Some(timings) = timings.as_deref_mut() {
                timings.push(StageTiming {
                    name: stage.name().into_owned(),
                    duration: start.elapsed(),
                    items_in: 1,
                    items_out: 1,
                });
            }
        }
        Ok(data)
    }
}

impl<S: Stage + 'static> Shr<S> for Pipe {
    type Output = Pipe;

    fn shr(self, stage: S) -> Pipe {
        self.stage(stage)
    }
}

impl<S: Stage + 'static> ShrAssign<S> for Pipe {
    fn shr_assign(&mut self, stage: S) {
        self.stages.push(stage);
    }
}

impl fmt::Display for Pipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pipe({})", self.stages)
    }
}

impl fmt::Debug for Pipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipe")
            .field("stages", &self.stages)
            .field("input", &self.input)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::emission::FanOut;
    use crate::pipeline::helpers::{keep, spread, tap};
    use crate::pipeline::stage::named;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn add_one(v: Value) -> anyhow::Result<Value> {
        Ok(Value::Int(v.try_int()? + 1))
    }

    fn double(v: Value) -> anyhow::Result<Value> {
        Ok(Value::Int(v.try_int()? * 2))
    }

    fn pair(v: Value) -> Value {
        Value::list(vec![v.clone(), v])
    }

    #[test]
    fn test_stages_apply_in_order() {
        let pipe = Pipe::with_input(3).stage(add_one).stage(double);
        assert_eq!(pipe.run().unwrap(), Value::Int(8));

        let reversed = Pipe::with_input(3).stage(double).stage(add_one);
        assert_eq!(reversed.run().unwrap(), Value::Int(7));
    }

    #[test]
    fn test_empty_pipe_returns_input() {
        assert_eq!(Pipe::with_input("x").run().unwrap(), Value::from("x"));
        assert_eq!(Pipe::new().run().unwrap(), Value::Null);
    }

    #[test]
    fn test_override_input() {
        let pipe = Pipe::with_input(1).stage(double);
        assert_eq!(pipe.run_with(10).unwrap(), Value::Int(20));
        assert_eq!(pipe.invoke(None).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_null_override_falls_back_to_default() {
        let pipe = Pipe::with_input(5).stage(|v: Value| v);
        assert_eq!(pipe.run_with(None::<i64>).unwrap(), Value::Int(5));
        assert_eq!(pipe.run_with(Value::Null).unwrap(), Value::Int(5));
        assert_eq!(pipe.invoke(Some(Value::Null)).unwrap(), Value::Int(5));
        assert_eq!(Pipe::new().run_with(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_operator_append() {
        let mut pipe = Pipe::with_input(1) >> add_one >> add_one;
        pipe >>= double;
        assert_eq!(pipe.len(), 3);
        assert_eq!(pipe.run().unwrap(), Value::Int(6));
    }

    #[test]
    fn test_push_chains_in_place() {
        let mut pipe = Pipe::with_input(0);
        pipe.push(add_one).push(add_one).push(double);
        assert_eq!(pipe.stage_names(), vec!["add_one", "add_one", "double"]);
        assert_eq!(pipe.run().unwrap(), Value::Int(4));
    }

    #[test]
    fn test_fan_out_collapses_to_list() {
        let pipe = Pipe::with_input(5).stage(spread(pair));
        assert_eq!(pipe.run().unwrap(), Value::from(vec![5, 5]));
    }

    #[test]
    fn test_collapsed_list_passed_whole_to_next_stage() {
        let count = |v: Value| Value::Int(v.as_list().map_or(-1, |xs| xs.len() as i64));
        let pipe = Pipe::with_input(5).stage(spread(pair)).stage(count);
        assert_eq!(pipe.run().unwrap(), Value::Int(2));
    }

    #[test]
    fn test_keep_changes_shape_to_list() {
        let pipe = Pipe::new().stage(keep(|v: &Value| v.as_int() == Some(2)));
        assert_eq!(pipe.run_with(2).unwrap(), Value::from(vec![2]));
        assert_eq!(pipe.run_with(3).unwrap(), Value::List(vec![]));
    }

    #[test]
    fn test_direct_fan_out_emission_collapses() {
        let pipe = Pipe::new().stage(|v: Value| FanOut::new(vec![v.clone(), v]));
        assert_eq!(pipe.run_with("a").unwrap(), Value::from(vec!["a", "a"]));
    }

    #[test]
    fn test_error_halts_pipeline() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let pipe = Pipe::with_input("not a number")
            .stage(double)
            .stage(tap(move |_: &Value| *counter.lock() += 1));

        let err = pipe.run().unwrap_err();
        assert!(err.downcast_ref::<crate::ValueError>().is_some());
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_invocations_are_independent() {
        let pipe = Pipe::with_input(1).stage(double);
        assert_eq!(pipe.run().unwrap(), pipe.run().unwrap());
        assert_eq!(pipe.len(), 1);
    }

    #[test]
    fn test_display() {
        let pipe = Pipe::new()
            .stage(add_one)
            .stage(spread(pair))
            .stage(named("Finish", |v: Value| v));
        assert_eq!(pipe.to_string(), "Pipe(add_one >> spread(pair) >> Finish)");
        assert_eq!(Pipe::new().to_string(), "Pipe()");

        let pointer: fn(Value) -> Value = pair;
        assert_eq!(Pipe::new().stage(pointer).to_string(), "Pipe(<fn>)");
    }

    #[test]
    fn test_conditional_append() {
        let with_extra = Pipe::with_input(1)
            .when(true, |p| p.stage(add_one))
            .stage(double);
        let without_extra = Pipe::with_input(1)
            .when(false, |p| p.stage(add_one))
            .stage(double);

        assert_eq!(with_extra.run().unwrap(), Value::Int(4));
        assert_eq!(without_extra.run().unwrap(), Value::Int(2));
    }

    #[test]
    fn test_timing() {
        let pipe = Pipe::with_input(1).stage(add_one).stage(double);
        let (result, timings) = pipe.run_with_timing(None).unwrap();

        assert_eq!(result, Value::Int(4));
        assert_eq!(timings.len(), 2);
        assert_eq!(timings[0].name, "add_one");
        assert_eq!(timings[1].name, "double");
    }

    #[test]
    fn test_progress_config_does_not_change_result() {
        let pipe = Pipe::with_input(2)
            .with_config(PipelineConfig::with_progress())
            .stage(double);
        assert_eq!(pipe.run().unwrap(), Value::Int(4));
    }
}
