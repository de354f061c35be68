//! Stage constructors: [`spread`], [`keep`] and [`tap`].

use super::emission::{Emission, FanOut};
use super::stage::Stage;
use crate::errors::StageResult;
use crate::value::Value;
use std::borrow::Cow;

/// Stage adapter that turns iterable results into fan-out.
///
/// Built by [`spread`].
pub struct Spread<S> {
    name: String,
    stage: S,
}

/// Wrap `stage` so that a container result is emitted item by item.
///
/// Lists and maps returned by `stage` become [`Emission::Many`]; text, bytes
/// and scalars pass through as a single value. Stream pipelines expand the
/// fan-out into separate items, single-value pipelines collapse it into a
/// list.
///
/// ```rust
/// use pipewright::{spread, PipeStream, Value};
///
/// fn twice(v: Value) -> Value {
///     Value::list(vec![v.clone(), v])
/// }
///
/// let stream = PipeStream::with_input(vec![1, 2]).stage(spread(twice));
/// assert_eq!(stream.run().unwrap(), Value::from(vec![1, 1, 2, 2]).into_items().unwrap());
/// assert_eq!(stream.to_string(), "PipeStream(spread(twice))");
/// ```
pub fn spread<S: Stage>(stage: S) -> Spread<S> {
    Spread {
        name: format!("spread({})", stage.name()),
        stage,
    }
}

impl<S: Stage> Stage for Spread<S> {
    fn apply(&self, input: Value) -> StageResult {
        match self.stage.apply(input)? {
            Emission::Single(value) => Ok(Emission::spread(value)),
            many @ Emission::Many(_) => Ok(many),
        }
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

/// Return type of a [`keep`] predicate: `bool`, or `Result<bool, E>`.
pub trait Verdict {
    fn into_verdict(self) -> anyhow::Result<bool>;
}

impl Verdict for bool {
    fn into_verdict(self) -> anyhow::Result<bool> {
        Ok(self)
    }
}

impl<E: Into<anyhow::Error>> Verdict for Result<bool, E> {
    fn into_verdict(self) -> anyhow::Result<bool> {
        self.map_err(Into::into)
    }
}

/// Filtering stage built by [`keep`].
pub struct Keep<P> {
    predicate: P,
}

/// Stage that keeps values for which `predicate` holds.
///
/// Emits a fan-out of zero or one items. In a stream this drops
/// non-matching items; in a single-value pipeline the value becomes a list
/// of zero or one elements.
pub fn keep<P, R>(predicate: P) -> Keep<P>
where
    P: Fn(&Value) -> R + Send + Sync,
    R: Verdict,
{
    Keep { predicate }
}

impl<P, R> Stage for Keep<P>
where
    P: Fn(&Value) -> R + Send + Sync,
    R: Verdict,
{
    fn apply(&self, input: Value) -> StageResult {
        if (self.predicate)(&input).into_verdict()? {
            Ok(Emission::Many(FanOut::new([input])))
        } else {
            Ok(Emission::Many(FanOut::empty()))
        }
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed("keep")
    }
}

/// Return type of a [`tap`] effect: `()`, or a `Result` whose `Ok` value is discarded.
pub trait Completion {
    fn into_completion(self) -> anyhow::Result<()>;
}

impl Completion for () {
    fn into_completion(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<T, E: Into<anyhow::Error>> Completion for Result<T, E> {
    fn into_completion(self) -> anyhow::Result<()> {
        self.map(drop).map_err(Into::into)
    }
}

/// Passthrough stage built by [`tap`].
pub struct Tap<F> {
    effect: F,
}

/// Stage that runs `effect` on each value and passes the value on unchanged.
pub fn tap<F, R>(effect: F) -> Tap<F>
where
    F: Fn(&Value) -> R + Send + Sync,
    R: Completion,
{
    Tap { effect }
}

impl<F, R> Stage for Tap<F>
where
    F: Fn(&Value) -> R + Send + Sync,
    R: Completion,
{
    fn apply(&self, input: Value) -> StageResult {
        (self.effect)(&input).into_completion()?;
        Ok(Emission::Single(input))
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed("tap")
    }
}
