//! The transport seam.
//!
//! The bridge core never talks to a socket, webview, or pipe directly; it
//! goes through [`Transport`], which models the only three things the
//! process boundary offers: a request/response call addressed by command
//! name, one named broadcast channel, and streaming handles for callback
//! arguments. Concrete transports live with the embedding application.

use std::fmt;
use std::future::Future;

use serde_json::{Map, Value};
use tokio::sync::mpsc;

/// Receiving end of a streaming argument.
///
/// Built from a caller's callback and handed to the transport, which pushes
/// incremental values through it for the lifetime of the call that carried
/// the handle.
pub struct StreamSink {
    on_item: Box<dyn FnMut(Value) + Send>,
}

impl StreamSink {
    pub fn new(on_item: impl FnMut(Value) + Send + 'static) -> Self {
        Self {
            on_item: Box::new(on_item),
        }
    }

    /// Deliver one incremental value to the caller's callback.
    pub fn push(&mut self, item: Value) {
        (self.on_item)(item);
    }
}

impl fmt::Debug for StreamSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSink").finish_non_exhaustive()
    }
}

/// Process-boundary primitives the bridge client is built on.
///
/// Errors from a transport are propagated to callers unchanged — the client
/// neither wraps nor retries them, so whatever diagnostic the transport
/// attaches survives intact.
pub trait Transport: Send + Sync + 'static {
    /// Issue one request/response call and resolve with the host's response.
    fn call(
        &self,
        command: &str,
        args: Map<String, Value>,
    ) -> impl Future<Output = anyhow::Result<Value>> + Send;

    /// Open the named broadcast channel, resolving once the host has
    /// acknowledged the subscription. Every received value is one raw event
    /// envelope; delivery order on the receiver is the host's send order.
    fn subscribe(
        &self,
        channel: &str,
    ) -> impl Future<Output = anyhow::Result<mpsc::Receiver<Value>>> + Send;

    /// Wrap a caller callback into a transport-native streaming handle.
    ///
    /// The returned value stands in for the callback inside a call's named
    /// arguments; the host pushes incremental values through it instead of
    /// answering with a single response.
    fn open_stream(&self, sink: StreamSink) -> anyhow::Result<Value>;
}
