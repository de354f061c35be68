//! What a stage emits: one value, or several.
//!
//! A stage that wants its result spread across the stream returns
//! [`Emission::Many`]. Stream pipelines expand it into separate items;
//! single-value pipelines collapse it back into one list value.

use crate::value::Value;
use std::fmt;

/// The ordered items of a multi-item stage result.
///
/// A `FanOut` is consumed by value, so each occurrence is iterated at most
/// once by the pipeline that receives it.
#[derive(Clone, PartialEq, Default)]
pub struct FanOut {
    items: Vec<Value>,
}

impl FanOut {
    /// Fan-out of `items`, emitted in iteration order.
    pub fn new<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// A fan-out that emits nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Emitted items, in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Number of emitted items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing is emitted.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Collapse into an ordered list of the emitted items.
    pub fn into_vec(self) -> Vec<Value> {
        self.items
    }
}

impl fmt::Debug for FanOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FanOut").field(&self.items).finish()
    }
}

impl IntoIterator for FanOut {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a FanOut {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Value> for FanOut {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Result of applying a stage to one value.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    Single(Value),
    Many(FanOut),
}

impl Emission {
    /// Wrap a value, turning fan-out containers into [`Emission::Many`].
    ///
    /// Atomic and scalar values stay [`Emission::Single`].
    pub fn spread(value: Value) -> Self {
        match value.into_items() {
            Ok(items) => Emission::Many(FanOut { items }),
            Err(value) => Emission::Single(value),
        }
    }

    /// Value seen by a single-value pipeline: a fan-out collapses to a list.
    pub fn collapse(self) -> Value {
        match self {
            Emission::Single(value) => value,
            Emission::Many(fan) => Value::List(fan.into_vec()),
        }
    }

    /// Append the emitted items to a stream, expanding a fan-out in order.
    pub fn flatten_into(self, stream: &mut Vec<Value>) {
        match self {
            Emission::Single(value) => stream.push(value),
            Emission::Many(fan) => stream.extend(fan),
        }
    }

    /// Number of stream items this emission produces.
    pub fn width(&self) -> usize {
        match self {
            Emission::Single(_) => 1,
            Emission::Many(fan) => fan.len(),
        }
    }
}

impl From<Value> for Emission {
    fn from(value: Value) -> Self {
        Emission::Single(value)
    }
}

impl From<FanOut> for Emission {
    fn from(fan: FanOut) -> Self {
        Emission::Many(fan)
    }
}

/// Anything a stage function may return.
///
/// Implemented for plain values, emissions, and `Result`s of either whose
/// error converts into [`anyhow::Error`].
pub trait StageOutput {
    fn into_emission(self) -> anyhow::Result<Emission>;
}

impl StageOutput for Value {
    fn into_emission(self) -> anyhow::Result<Emission> {
        Ok(Emission::Single(self))
    }
}

impl StageOutput for Emission {
    fn into_emission(self) -> anyhow::Result<Emission> {
        Ok(self)
    }
}

impl StageOutput for FanOut {
    fn into_emission(self) -> anyhow::Result<Emission> {
        Ok(Emission::Many(self))
    }
}

impl<T, E> StageOutput for Result<T, E>
where
    T: StageOutput,
    E: Into<anyhow::Error>,
{
    fn into_emission(self) -> anyhow::Result<Emission> {
        self.map_err(Into::<anyhow::Error>::into)?.into_emission()
    }
}
