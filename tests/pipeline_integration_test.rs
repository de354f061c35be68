//! End-to-end behaviour of both pipeline flavors through the public API.

use indoc::indoc;
use parking_lot::Mutex;
use pipewright::{
    keep, named, spread, tap, Emission, FanOut, Pipe, PipeStream, PipelineConfig, Stage, Value,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
#[error("rejected {0}")]
struct Rejected(i64);

fn add_one(v: Value) -> anyhow::Result<Value> {
    Ok(Value::Int(v.try_int()? + 1))
}

fn square(v: Value) -> anyhow::Result<Value> {
    let n = v.try_int()?;
    Ok(Value::Int(n * n))
}

fn reject_three(v: Value) -> Result<Value, Rejected> {
    match v.as_int() {
        Some(3) => Err(Rejected(3)),
        _ => Ok(v),
    }
}

fn split_csv(v: Value) -> anyhow::Result<Value> {
    Ok(Value::list(v.try_str()?.split(',').map(str::trim)))
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Int).collect()
}

#[test]
fn test_chained_appends_build_one_pipeline() {
    let mut pipe = Pipe::with_input(2);
    pipe.push(add_one).push(square).push(add_one);

    assert_eq!(pipe.len(), 3);
    assert_eq!(pipe.run().unwrap(), Value::Int(10));
    assert_eq!(pipe.to_string(), "Pipe(add_one >> square >> add_one)");
}

#[test]
fn test_spread_inside_stream_expands_in_order() {
    let stream = PipeStream::with_input(vec!["a, b", "c"]).stage(spread(split_csv));
    assert_eq!(
        stream.run().unwrap(),
        vec![Value::from("a"), Value::from("b"), Value::from("c")]
    );
}

#[test]
fn test_spread_returning_text_or_bytes_does_not_expand() {
    let text = |_: Value| Value::from("xyz");
    let bytes = |_: Value| Value::bytes(*b"xyz");

    let stream = PipeStream::with_input(vec![1]).stage(spread(text));
    assert_eq!(stream.run().unwrap(), vec![Value::from("xyz")]);

    let stream = PipeStream::with_input(vec![1]).stage(spread(bytes));
    assert_eq!(stream.run().unwrap(), vec![Value::bytes(*b"xyz")]);
}

#[test]
fn test_stream_seed_rules() {
    assert_eq!(PipeStream::with_input(vec![1, 2, 3]).run().unwrap(), ints(&[1, 2, 3]));
    assert_eq!(
        PipeStream::with_input("abc").run().unwrap(),
        vec![Value::from("abc")]
    );
    assert!(PipeStream::new().run().unwrap().is_empty());
}

#[test]
fn test_keep_filters_stream() {
    let stream = PipeStream::with_input(vec![1, 2, 3, 4, 5, 6])
        .stage(keep(|v: &Value| v.try_int().map(|n| n % 2 == 0)));
    assert_eq!(stream.run().unwrap(), ints(&[2, 4, 6]));
}

#[test]
fn test_tap_observes_stream_in_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let stream = PipeStream::with_input(vec![4, 5, 6])
        .stage(tap(move |v: &Value| sink.lock().push(v.clone())));

    assert_eq!(stream.run().unwrap(), ints(&[4, 5, 6]));
    assert_eq!(*seen.lock(), ints(&[4, 5, 6]));
}

#[test]
fn test_from_pipe_matches_per_item_composition() {
    let pipe = Pipe::new().stage(add_one).stage(square);
    let stream = PipeStream::from_pipe(&pipe, vec![10, 20]);

    assert_eq!(stream.run().unwrap(), ints(&[121, 441]));
    assert_eq!(
        stream.run().unwrap(),
        vec![pipe.run_with(10).unwrap(), pipe.run_with(20).unwrap()]
    );
}

#[test]
fn test_stream_error_propagates_unwrapped() {
    let processed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&processed);
    let stream = PipeStream::with_input(vec![1, 2, 3, 4])
        .stage(reject_three)
        .stage(tap(move |v: &Value| sink.lock().push(v.clone())));

    let err = stream.run().unwrap_err();
    let rejected = err.downcast_ref::<Rejected>().expect("stage error is returned as-is");
    assert_eq!(rejected.0, 3);
    assert_eq!(err.to_string(), "rejected 3");
    assert!(processed.lock().is_empty());
}

#[test]
fn test_stream_error_stops_remaining_items_of_the_wave() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let stream = PipeStream::with_input(vec![1, 2, 3, 4]).stage(move |v: Value| {
        sink.lock().push(v.clone());
        reject_three(v)
    });

    let err = stream.run().unwrap_err();
    assert!(err.downcast_ref::<Rejected>().is_some());
    assert_eq!(*received.lock(), ints(&[1, 2, 3]));
}

#[test]
fn test_pipe_error_propagates_unwrapped() {
    let pipe = Pipe::with_input(3).stage(reject_three).stage(add_one);
    let err = pipe.run().unwrap_err();
    assert!(err.downcast_ref::<Rejected>().is_some());
}

#[test]
fn test_keep_in_pipe_yields_sequence() {
    let pipe = Pipe::new().stage(keep(|v: &Value| v.as_int() == Some(1)));
    assert_eq!(pipe.run_with(1).unwrap(), Value::from(vec![1]));
    assert_eq!(pipe.run_with(2).unwrap(), Value::List(Vec::new()));
}

#[test]
fn test_custom_stage_type() {
    struct Repeat(usize);

    impl Stage for Repeat {
        fn apply(&self, input: Value) -> pipewright::StageResult {
            Ok(Emission::Many(FanOut::new(vec![input; self.0])))
        }

        fn name(&self) -> std::borrow::Cow<'_, str> {
            format!("repeat({})", self.0).into()
        }
    }

    let stream = PipeStream::with_input(vec![7, 8]).stage(Repeat(2));
    assert_eq!(stream.run().unwrap(), ints(&[7, 7, 8, 8]));
    assert_eq!(stream.to_string(), "PipeStream(repeat(2))");

    let pipe = Pipe::with_input(7).stage(Repeat(3));
    assert_eq!(pipe.run().unwrap(), Value::from(vec![7, 7, 7]));
}

#[test]
fn test_json_document_as_stream_seed() {
    let doc: serde_json::Value = serde_json::from_str(r#"[{"n": 1}, {"n": 2}]"#).unwrap();
    let field_n = named("field n", |v: Value| {
        v.as_map()
            .and_then(|m| m.get("n"))
            .cloned()
            .unwrap_or(Value::Null)
    });
    let stream = PipeStream::with_input(doc).stage(field_n);
    assert_eq!(stream.run().unwrap(), ints(&[1, 2]));
}

#[test]
fn test_config_from_toml_drives_progress() {
    let config = PipelineConfig::from_toml_str(indoc! {"
        progress = true
        quiet = false
    "})
    .unwrap();
    let stream = PipeStream::with_input(vec![1, 2])
        .with_config(config)
        .stage(add_one);

    assert!(stream.config().reports_progress());
    assert_eq!(stream.run().unwrap(), ints(&[2, 3]));
}
