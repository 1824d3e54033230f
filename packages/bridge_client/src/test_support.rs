//! In-memory transport double shared by the unit and end-to-end tests.
//!
//! Records every outbound call, scripts responses and failures per command,
//! counts broadcast subscriptions, and captures opened stream sinks so tests
//! can drive incremental pushes by hand.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::transport::{StreamSink, Transport};

#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
    responses: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashMap<String, String>>,
    subscribers: Mutex<Vec<mpsc::Sender<Value>>>,
    streams: Mutex<Vec<StreamSink>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Script the response for `command`; unknown commands answer `null`.
    pub(crate) fn respond(&self, command: &str, response: Value) {
        self.inner
            .responses
            .lock()
            .unwrap()
            .insert(command.to_string(), response);
    }

    /// Make `command` reject with `message`.
    pub(crate) fn fail(&self, command: &str, message: &str) {
        self.inner
            .failures
            .lock()
            .unwrap()
            .insert(command.to_string(), message.to_string());
    }

    /// Every `(command, named_args)` pair seen so far, in call order.
    pub(crate) fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.inner.calls.lock().unwrap().len()
    }

    /// Number of broadcast subscriptions opened over this transport.
    pub(crate) fn subscription_count(&self) -> usize {
        self.inner.subscribers.lock().unwrap().len()
    }

    /// Whether every opened subscription has been dropped by its reader.
    pub(crate) fn subscriptions_closed(&self) -> bool {
        self.inner
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .all(|sender| sender.is_closed())
    }

    pub(crate) fn stream_count(&self) -> usize {
        self.inner.streams.lock().unwrap().len()
    }

    /// Push one incremental value through the stream registered as `id`.
    pub(crate) fn push_stream(&self, id: usize, item: Value) {
        self.inner.streams.lock().unwrap()[id].push(item);
    }

    /// Deliver one raw envelope to every open subscription.
    pub(crate) async fn emit(&self, envelope: Value) {
        let senders: Vec<_> = self.inner.subscribers.lock().unwrap().clone();
        for sender in senders {
            let _ = sender.send(envelope.clone()).await;
        }
    }
}

impl Transport for MockTransport {
    fn call(
        &self,
        command: &str,
        args: Map<String, Value>,
    ) -> impl Future<Output = anyhow::Result<Value>> + Send {
        let inner = Arc::clone(&self.inner);
        let command = command.to_string();
        async move {
            inner.calls.lock().unwrap().push((command.clone(), args));
            if let Some(message) = inner.failures.lock().unwrap().get(&command).cloned() {
                return Err(anyhow::anyhow!(message));
            }
            let response = inner
                .responses
                .lock()
                .unwrap()
                .get(&command)
                .cloned()
                .unwrap_or(Value::Null);
            Ok(response)
        }
    }

    fn subscribe(
        &self,
        _channel: &str,
    ) -> impl Future<Output = anyhow::Result<mpsc::Receiver<Value>>> + Send {
        let inner = Arc::clone(&self.inner);
        async move {
            let (tx, rx) = mpsc::channel(64);
            inner.subscribers.lock().unwrap().push(tx);
            Ok(rx)
        }
    }

    fn open_stream(&self, sink: StreamSink) -> anyhow::Result<Value> {
        let mut streams = self.inner.streams.lock().unwrap();
        let id = streams.len();
        streams.push(sink);
        Ok(Value::from(id as u64))
    }
}
