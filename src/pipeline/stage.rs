//! Stage abstraction shared by both pipeline flavors.
//!
//! A stage is an opaque unary function from [`Value`] to an [`Emission`].
//! Any `Fn(Value) -> R` where `R` is a [`StageOutput`] is already a stage, so
//! plain functions and closures can be appended directly:
//!
//! ```rust
//! use pipewright::{named, Pipe, Stage, Value};
//!
//! fn shout(v: Value) -> anyhow::Result<Value> {
//!     Ok(Value::from(v.try_str()?.to_uppercase()))
//! }
//!
//! assert_eq!(Stage::name(&shout), "shout");
//!
//! let pipe = Pipe::with_input("hi")
//!     .stage(shout)
//!     .stage(named("exclaim", |v: Value| Value::from(format!("{}!", v.as_str().unwrap_or("")))));
//! assert_eq!(pipe.run().unwrap(), Value::from("HI!"));
//! assert_eq!(pipe.to_string(), "Pipe(shout >> exclaim)");
//! ```

use super::emission::StageOutput;
use crate::errors::StageResult;
use crate::value::Value;
use std::borrow::Cow;
use std::sync::Arc;

/// A pipeline stage.
///
/// Stages may fail; the error is returned to the pipeline caller as-is.
pub trait Stage: Send + Sync {
    /// Apply this stage to one value.
    fn apply(&self, input: Value) -> StageResult;

    /// Display name, used in pipeline representations and logs.
    fn name(&self) -> Cow<'_, str>;
}

/// Shared handle to a stage. Pipelines hold stages by reference, never by copy.
pub type StageRef = Arc<dyn Stage>;

impl<F, R> Stage for F
where
    F: Fn(Value) -> R + Send + Sync,
    R: StageOutput,
{
    fn apply(&self, input: Value) -> StageResult {
        self(input).into_emission()
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(short_type_name::<F>())
    }
}

/// A stage with an explicit display name.
pub struct Named<S> {
    name: String,
    stage: S,
}

/// Give `stage` a display name.
pub fn named<S: Stage>(name: impl Into<String>, stage: S) -> Named<S> {
    Named {
        name: name.into(),
        stage,
    }
}

impl<S: Stage> Stage for Named<S> {
    fn apply(&self, input: Value) -> StageResult {
        self.stage.apply(input)
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

/// Last path segment of a type name: `double` for a fn item, `<closure>` for
/// closures and `<fn>` for function pointers.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    if full.ends_with("{{closure}}") {
        return "<closure>";
    }
    if full.starts_with("fn(") {
        return "<fn>";
    }
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
