//! # Pipewright: composable pipelines of unary stages
//!
//! Chain transformation functions without writing loops, and let a stage
//! expand one item into many when it explicitly asks to.
//!
//! ## Pipeline flavors
//!
//! - **[`Pipe`]**: single-value pipeline. Each stage gets the previous result.
//! - **[`PipeStream`]**: stream pipeline. A container input, or a stage
//!   wrapped with [`spread`], fans out into separate items.
//!
//! ## Atomic values
//!
//! Text and bytes are never expanded, even though they are iterable. Only
//! lists and maps fan out (see [`Value::fans_out`]).
//!
//! ## Example
//!
//! ```
//! use pipewright::*;
//!
//! fn words(v: Value) -> anyhow::Result<Value> {
//!     Ok(Value::list(v.try_str()?.split_whitespace()))
//! }
//!
//! fn length(v: Value) -> anyhow::Result<Value> {
//!     Ok(Value::Int(v.try_str()?.len() as i64))
//! }
//!
//! // Single value: the word list is passed on whole.
//! let pipe = Pipe::with_input("to be or not") >> words;
//! assert_eq!(pipe.run()?, Value::list(["to", "be", "or", "not"]));
//!
//! // Stream: every word becomes its own item.
//! let stream = PipeStream::from_pipe(&Pipe::new().stage(spread(words)), "to be or not")
//!     .stage(length)
//!     .stage(keep(|n: &Value| n.as_int() == Some(2)));
//! assert_eq!(stream.run()?.len(), 3);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Errors
//!
//! Whatever a stage returns as an error aborts the run and reaches the caller
//! unchanged; see [`errors`].

pub mod config;
pub mod errors;
pub mod observability;
pub mod pipeline;
pub mod value;

pub use crate::config::PipelineConfig;
pub use crate::errors::{ConfigError, StageResult, ValueError};
pub use crate::pipeline::{
    keep, named, spread, tap, Emission, FanOut, Pipe, PipeStream, Stage, StageOutput, StageRef,
    StageTiming, StreamIter,
};
pub use crate::value::Value;
