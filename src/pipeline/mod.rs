//! Pipelines of unary stages.
//!
//! Two flavors share one stage model:
//!
//! - [`Pipe`] threads a single value through its stages. A stage that emits
//!   several items hands the next stage one list of them.
//! - [`PipeStream`] threads a sequence of items. A stage that emits several
//!   items adds each of them to the stream.
//!
//! Fan-out is always opt-in: a stage returning a list is a single list value
//! unless it is wrapped with [`spread`] or returns an [`Emission::Many`]
//! itself, as [`keep`] does.

pub mod emission;
pub mod helpers;
pub mod pipe;
pub mod stack;
pub mod stage;
pub mod stream;
pub mod timing;

pub use emission::{Emission, FanOut, StageOutput};
pub use helpers::{keep, spread, tap, Completion, Keep, Spread, Tap, Verdict};
pub use pipe::Pipe;
pub use stack::StageStack;
pub use stage::{named, Named, Stage, StageRef};
pub use stream::{PipeStream, StreamIter};
pub use timing::StageTiming;
