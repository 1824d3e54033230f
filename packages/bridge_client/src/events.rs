//! Event demultiplexer.
//!
//! Every event-capable procedure shares one broadcast channel; subscribing
//! per procedure would cost a channel-registration round trip each. The
//! broker subscribes once, then routes each inbound envelope to the listener
//! registered under its `event_name`, in arrival order, without batching.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::OnceCell;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use bridge_proto::{EventEnvelope, Manifest, wire};

use crate::registry::ListenerRegistry;
use crate::transport::Transport;

/// One-per-client broker owning the broadcast subscription and its reader
/// task.
pub(crate) struct EventBroker {
    subscription: OnceCell<()>,
    cancel: CancellationToken,
}

impl EventBroker {
    pub(crate) fn new() -> Self {
        Self {
            subscription: OnceCell::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Establish the broadcast subscription if it is not already up.
    ///
    /// Concurrent callers are serialized; the transport's `subscribe` runs
    /// at most once for the client's lifetime. A failed attempt leaves the
    /// broker unsubscribed so a later registration can retry.
    pub(crate) async fn ensure_subscribed<T: Transport>(
        &self,
        transport: &T,
        manifest: &Arc<Manifest>,
        registry: &Arc<ListenerRegistry>,
    ) -> anyhow::Result<()> {
        self.subscription
            .get_or_try_init(|| async {
                let rx = transport.subscribe(wire::EVENT_CHANNEL).await?;
                debug!(channel = wire::EVENT_CHANNEL, "broadcast subscription established");

                let manifest = Arc::clone(manifest);
                let registry = Arc::clone(registry);
                let cancel = self.cancel.clone();
                tokio::spawn(dispatch_loop(rx, manifest, registry, cancel));
                Ok::<(), anyhow::Error>(())
            })
            .await?;
        Ok(())
    }

    /// Stop the reader task. Registered listeners stay in the registry but
    /// receive nothing further.
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }
}

async fn dispatch_loop(
    mut rx: mpsc::Receiver<Value>,
    manifest: Arc<Manifest>,
    registry: Arc<ListenerRegistry>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            raw = rx.recv() => {
                match raw {
                    Some(raw) => dispatch_envelope(raw, &manifest, &registry),
                    None => {
                        debug!("event channel closed by transport");
                        break;
                    }
                }
            }
        }
    }
}

/// Route one raw envelope to its listener.
///
/// No listener for the routing key is routine, not an error: listener
/// presence is optional and timing-dependent. A malformed envelope is
/// logged and skipped.
pub(crate) fn dispatch_envelope(raw: Value, manifest: &Manifest, registry: &ListenerRegistry) {
    let envelope: EventEnvelope = match serde_json::from_value(raw) {
        Ok(envelope) => envelope,
        Err(error) => {
            warn!(error = %error, "malformed event envelope, skipping");
            return;
        }
    };

    let Some(callback) = registry.lookup(&envelope.event_name) else {
        debug!(event = %envelope.event_name, "no listener registered, dropping event");
        return;
    };

    let params = manifest.params_for_path(&envelope.event_name);
    let args = shape_payload(params.as_deref(), envelope.event.input_type);
    callback(args);
}

/// Shape the raw payload into the positional arguments the listener sees,
/// matching the calling convention used for outbound calls: exactly one
/// declared parameter passes the payload through; an array payload for a
/// multi-parameter procedure is spread; everything else is a single value.
fn shape_payload(params: Option<&[String]>, payload: Value) -> Vec<Value> {
    match params {
        Some(params) if params.len() == 1 => vec![payload],
        Some(params) if params.len() > 1 => match payload {
            Value::Array(items) => items,
            other => vec![other],
        },
        _ => vec![payload],
    }
}
