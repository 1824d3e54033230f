//! Positional→named argument marshalling.
//!
//! The transport only accepts named-parameter objects, while callers supply
//! arguments positionally; the manifest's parameter-name order is the bridge
//! between the two. Marshalling happens entirely before the outbound call —
//! a partially-built payload is never sent.

use serde_json::{Map, Value};

use crate::error::CallError;
use crate::transport::{StreamSink, Transport};

/// One positional call argument: a plain JSON value, or a streaming callback
/// that the transport turns into a channel handle occupying the same slot.
#[derive(Debug)]
pub enum CallArg {
    Value(Value),
    Stream(StreamSink),
}

impl CallArg {
    /// Wrap a callback so the host can push incremental values through this
    /// argument slot for the duration of the call.
    pub fn stream(on_item: impl FnMut(Value) + Send + 'static) -> Self {
        CallArg::Stream(StreamSink::new(on_item))
    }
}

impl From<Value> for CallArg {
    fn from(value: Value) -> Self {
        CallArg::Value(value)
    }
}

/// Zip positional arguments with the declared parameter names into the named
/// object the transport expects.
///
/// Surplus arguments (no parameter name at that index) mean the manifest and
/// the call site disagree about the procedure's arity — a codegen
/// consistency error, refused rather than silently truncated. Unfilled
/// trailing parameters marshal as `null`.
pub(crate) fn to_named<T: Transport>(
    transport: &T,
    path: &str,
    params: &[String],
    args: Vec<CallArg>,
) -> Result<Map<String, Value>, CallError> {
    if args.len() > params.len() {
        return Err(CallError::MissingParamName {
            path: path.to_string(),
            index: params.len(),
        });
    }

    let mut named = Map::with_capacity(params.len());
    let mut args = args.into_iter();
    for (index, name) in params.iter().enumerate() {
        if name.is_empty() {
            return Err(CallError::MissingParamName {
                path: path.to_string(),
                index,
            });
        }
        let value = match args.next() {
            Some(CallArg::Value(value)) => value,
            Some(CallArg::Stream(sink)) => transport.open_stream(sink)?,
            None => Value::Null,
        };
        named.insert(name.clone(), value);
    }
    Ok(named)
}
