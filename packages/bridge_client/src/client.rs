//! Client façade: construction, root access, and the flat listener surface.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;

use bridge_proto::{Manifest, ManifestError, ManifestSource, wire};

use crate::error::{ConnectError, RouteError, SubscribeError};
use crate::events::EventBroker;
use crate::registry::{EventCallback, ListenerHandle, ListenerRegistry};
use crate::router::{NamespaceNode, ProcedureNode, RouteNode};
use crate::transport::Transport;

/// State shared by every node derived from one client: the transport, the
/// read-only manifest, the listener registry, and the broadcast broker.
pub(crate) struct Shared<T: Transport> {
    pub(crate) transport: T,
    pub(crate) manifest: Arc<Manifest>,
    pub(crate) registry: Arc<ListenerRegistry>,
    broker: EventBroker,
}

impl<T: Transport> Shared<T> {
    pub(crate) async fn ensure_subscribed(&self) -> anyhow::Result<()> {
        self.broker
            .ensure_subscribed(&self.transport, &self.manifest, &self.registry)
            .await
    }

    pub(crate) fn register_listener(
        &self,
        path: &str,
        callback: Arc<EventCallback>,
    ) -> ListenerHandle {
        let id = self.registry.register(path, callback);
        ListenerHandle::new(Arc::clone(&self.registry), path.to_string(), id)
    }

    fn shutdown(&self) {
        self.broker.cancel();
    }
}

/// The client half of the bridge.
///
/// Presents the host's declared namespace hierarchy as resolvable, callable
/// nodes without knowing its shape ahead of time: the hierarchy is data,
/// read from the manifest at construction and walked lazily on access.
///
/// Cloning is cheap and clones share everything, including the single
/// broadcast subscription.
pub struct BridgeClient<T: Transport> {
    shared: Arc<Shared<T>>,
}

impl<T: Transport> Clone for BridgeClient<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Transport> BridgeClient<T> {
    /// Asynchronous construction: fetch the manifest through the one-time
    /// setup call, then establish the broadcast subscription before
    /// returning, so listener registration afterwards is purely a registry
    /// write.
    pub async fn connect(transport: T) -> Result<Self, ConnectError> {
        let response = transport
            .call(wire::SETUP_COMMAND, Map::new())
            .await
            .map_err(ConnectError::Transport)?;
        let Value::String(encoded) = response else {
            return Err(ConnectError::SetupNotAString);
        };
        let raw: HashMap<String, String> =
            serde_json::from_str(&encoded).map_err(ConnectError::InvalidSetup)?;
        let manifest = Manifest::parse(&raw)?;

        let client = Self::assemble(transport, manifest);
        client
            .shared
            .ensure_subscribed()
            .await
            .map_err(ConnectError::Transport)?;
        info!(
            namespaces = client.shared.manifest.namespace_count(),
            "bridge client connected"
        );
        Ok(client)
    }

    /// Synchronous construction from a manifest the caller already has,
    /// either the serialized per-namespace form or decoded tables. The
    /// broadcast subscription is then established once, lazily, by the
    /// first listener registration.
    pub fn with_manifest(
        transport: T,
        source: impl Into<ManifestSource>,
    ) -> Result<Self, ManifestError> {
        let manifest = source.into().into_manifest()?;
        Ok(Self::assemble(transport, manifest))
    }

    fn assemble(transport: T, manifest: Manifest) -> Self {
        Self {
            shared: Arc::new(Shared {
                transport,
                manifest: Arc::new(manifest),
                registry: Arc::new(ListenerRegistry::new()),
                broker: EventBroker::new(),
            }),
        }
    }

    /// The root namespace node.
    pub fn root(&self) -> NamespaceNode<T> {
        NamespaceNode::new(Arc::clone(&self.shared), String::new())
    }

    /// Resolve any dotted path from the root.
    pub fn resolve(&self, path: &str) -> Result<RouteNode<T>, RouteError> {
        self.root().resolve(path)
    }

    /// Resolve a dotted path that must name a callable procedure.
    pub fn procedure(&self, path: &str) -> Result<ProcedureNode<T>, RouteError> {
        match self.resolve(path)? {
            RouteNode::Procedure(node) => Ok(node),
            RouteNode::Namespace(_) => Err(RouteError::NotAProcedure {
                path: path.to_string(),
            }),
            RouteNode::Inert => Err(RouteError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    /// Register a listener by dotted path, the flat counterpart of
    /// [`ProcedureNode::on`]. Both surfaces write the same registry entry.
    pub async fn on(
        &self,
        path: &str,
        callback: impl Fn(Vec<Value>) + Send + Sync + 'static,
    ) -> Result<ListenerHandle, SubscribeError> {
        if self.shared.manifest.params_for_path(path).is_none() {
            return Err(SubscribeError::UnknownProcedure {
                path: path.to_string(),
            });
        }
        self.shared.ensure_subscribed().await?;
        Ok(self.shared.register_listener(path, Arc::new(callback)))
    }

    /// Remove whatever listener is currently registered at `path`, if any.
    /// Safe to call when nothing is registered.
    pub fn unsubscribe(&self, path: &str) -> bool {
        self.shared.registry.unregister(path)
    }

    /// The manifest this client was constructed with.
    pub fn manifest(&self) -> &Manifest {
        &self.shared.manifest
    }

    /// Stop the event reader task. Outbound calls keep working; pushed
    /// events are no longer delivered.
    pub fn shutdown(&self) {
        self.shared.shutdown();
    }
}
