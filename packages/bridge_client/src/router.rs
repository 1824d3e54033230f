//! Lazy route resolution over the manifest.
//!
//! The callable surface is not built ahead of time — the namespace shape is
//! data, discovered at runtime, with unbounded nesting. Nodes are therefore
//! derived on every access from the manifest alone: they own no state beyond
//! their path, and two nodes resolved for the same path are interchangeable.
//! Unknown paths fail at the access site, before any transport traffic.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use bridge_proto::manifest::ParamNames;
use bridge_proto::wire;

use crate::client::Shared;
use crate::error::{CallError, RouteError, SubscribeError};
use crate::marshal::{self, CallArg};
use crate::registry::ListenerHandle;
use crate::transport::Transport;

/// Member names that promise-adapter shims probe on arbitrary objects when
/// deciding whether to await them. They resolve to an inert node instead of
/// a missing-route error so such probes stay harmless.
const RESERVED_PROBE_SEGMENTS: &[&str] = &["then"];

/// Result of resolving one path segment.
pub enum RouteNode<T: Transport> {
    /// Interior node; deeper segments resolve against it.
    Namespace(NamespaceNode<T>),
    /// Callable leaf, also carrying the listener-registration capability.
    /// A name declared as both a procedure and a namespace resolves here;
    /// descend past it with [`NamespaceNode::namespace`].
    Procedure(ProcedureNode<T>),
    /// Reserved probe segment. Not callable, not a namespace, not an error.
    Inert,
}

impl<T: Transport> fmt::Debug for RouteNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteNode::Namespace(node) => f.debug_tuple("Namespace").field(node).finish(),
            RouteNode::Procedure(node) => f.debug_tuple("Procedure").field(node).finish(),
            RouteNode::Inert => f.write_str("Inert"),
        }
    }
}

/// A namespace in the declared hierarchy, addressed by dot-joined path
/// (empty for the root).
pub struct NamespaceNode<T: Transport> {
    shared: Arc<Shared<T>>,
    path: String,
}

impl<T: Transport> Clone for NamespaceNode<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            path: self.path.clone(),
        }
    }
}

impl<T: Transport> fmt::Debug for NamespaceNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceNode").field("path", &self.path).finish()
    }
}

impl<T: Transport> NamespaceNode<T> {
    pub(crate) fn new(shared: Arc<Shared<T>>, path: String) -> Self {
        Self { shared, path }
    }

    /// Dot-joined namespace path; empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn child_key(&self, segment: &str) -> String {
        if self.path.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{segment}", self.path)
        }
    }

    /// Resolve one further segment.
    ///
    /// A procedure declared under this namespace wins over a namespace of
    /// the same name, matching call-position access; use
    /// [`NamespaceNode::namespace`] to descend through such a name instead.
    pub fn get(&self, segment: &str) -> Result<RouteNode<T>, RouteError> {
        if RESERVED_PROBE_SEGMENTS.contains(&segment) {
            return Ok(RouteNode::Inert);
        }
        if let Some(params) = self.shared.manifest.params(&self.path, segment) {
            return Ok(RouteNode::Procedure(ProcedureNode {
                shared: Arc::clone(&self.shared),
                path: self.child_key(segment),
                params,
            }));
        }
        let key = self.child_key(segment);
        if self.shared.manifest.is_namespace(&key) {
            return Ok(RouteNode::Namespace(NamespaceNode::new(
                Arc::clone(&self.shared),
                key,
            )));
        }
        Err(RouteError::NotFound { path: key })
    }

    /// Resolve `segment` as a namespace, bypassing the procedure tie-break.
    pub fn namespace(&self, segment: &str) -> Result<NamespaceNode<T>, RouteError> {
        let key = self.child_key(segment);
        if self.shared.manifest.is_namespace(&key) {
            return Ok(NamespaceNode::new(Arc::clone(&self.shared), key));
        }
        if self.shared.manifest.params(&self.path, segment).is_some() {
            return Err(RouteError::NotANamespace { path: key });
        }
        Err(RouteError::NotFound { path: key })
    }

    /// Resolve `segment` as a callable procedure.
    pub fn procedure(&self, segment: &str) -> Result<ProcedureNode<T>, RouteError> {
        match self.get(segment)? {
            RouteNode::Procedure(node) => Ok(node),
            RouteNode::Namespace(_) => Err(RouteError::NotAProcedure {
                path: self.child_key(segment),
            }),
            RouteNode::Inert => Err(RouteError::NotFound {
                path: self.child_key(segment),
            }),
        }
    }

    /// Resolve a full dotted path relative to this node. Intermediate
    /// segments resolve as namespaces; the final segment follows the
    /// procedure-before-namespace tie-break.
    pub fn resolve(&self, path: &str) -> Result<RouteNode<T>, RouteError> {
        if path.is_empty() {
            return Ok(RouteNode::Namespace(self.clone()));
        }
        let (parents, leaf) = match path.rsplit_once('.') {
            Some((parents, leaf)) => (parents, leaf),
            None => ("", path),
        };
        let mut node = self.clone();
        if !parents.is_empty() {
            for segment in parents.split('.') {
                node = node.namespace(segment)?;
            }
        }
        node.get(leaf)
    }
}

/// A callable leaf: the product of an invoke operation and a listener
/// registration, bound to one fully-qualified path and its declared
/// parameter names.
pub struct ProcedureNode<T: Transport> {
    shared: Arc<Shared<T>>,
    path: String,
    params: ParamNames,
}

impl<T: Transport> Clone for ProcedureNode<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            path: self.path.clone(),
            params: Arc::clone(&self.params),
        }
    }
}

impl<T: Transport> fmt::Debug for ProcedureNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureNode")
            .field("path", &self.path)
            .field("params", &self.params)
            .finish()
    }
}

impl<T: Transport> ProcedureNode<T> {
    /// Fully-qualified dotted path of this procedure.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Declared parameter names, in positional order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Marshal `args` into the named-parameter object and issue the call.
    /// Marshalling failures surface before anything reaches the transport;
    /// transport failures propagate unchanged.
    pub async fn invoke(&self, args: Vec<CallArg>) -> Result<Value, CallError> {
        let named = marshal::to_named(&self.shared.transport, &self.path, &self.params, args)?;
        let command = wire::command_for(&self.path);
        self.shared
            .transport
            .call(&command, named)
            .await
            .map_err(CallError::Transport)
    }

    /// Register `callback` for this procedure's pushed events.
    ///
    /// The first registration on a client establishes the shared broadcast
    /// subscription; later ones reuse it. Returns the disposer handle for
    /// this specific registration.
    pub async fn on(
        &self,
        callback: impl Fn(Vec<Value>) + Send + Sync + 'static,
    ) -> Result<ListenerHandle, SubscribeError> {
        self.shared.ensure_subscribed().await?;
        Ok(self.shared.register_listener(&self.path, Arc::new(callback)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::BridgeClient;
    use crate::test_support::MockTransport;
    use serde_json::json;
    use std::collections::HashMap;

    fn client() -> (MockTransport, BridgeClient<MockTransport>) {
        let transport = MockTransport::new();
        let tables: HashMap<String, HashMap<String, Vec<String>>> = HashMap::from([
            (
                "".to_string(),
                HashMap::from([
                    ("greet".to_string(), vec!["name".to_string()]),
                    ("ping".to_string(), vec![]),
                    // "status" is both a root procedure and a namespace.
                    ("status".to_string(), vec![]),
                ]),
            ),
            (
                "math".to_string(),
                HashMap::from([("add".to_string(), vec!["a".to_string(), "b".to_string()])]),
            ),
            (
                "status".to_string(),
                HashMap::from([("detail".to_string(), vec![])]),
            ),
            (
                "api.ui".to_string(),
                HashMap::from([("trigger".to_string(), vec![])]),
            ),
        ]);
        let client = BridgeClient::with_manifest(transport.clone(), tables).unwrap();
        (transport, client)
    }

    #[test]
    fn resolves_root_procedure() {
        let (_transport, client) = client();
        match client.root().get("greet").unwrap() {
            RouteNode::Procedure(node) => {
                assert_eq!(node.path(), "greet");
                assert_eq!(node.params(), ["name".to_string()]);
            }
            _ => panic!("expected procedure node"),
        }
    }

    #[test]
    fn resolves_nested_procedure_through_namespace() {
        let (_transport, client) = client();
        let math = match client.root().get("math").unwrap() {
            RouteNode::Namespace(node) => node,
            _ => panic!("expected namespace node"),
        };
        let add = math.procedure("add").unwrap();
        assert_eq!(add.path(), "math.add");
        assert_eq!(add.params(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn resolves_prefix_only_namespace() {
        let (_transport, client) = client();
        // "api" is declared only as a prefix of "api.ui".
        let api = match client.root().get("api").unwrap() {
            RouteNode::Namespace(node) => node,
            _ => panic!("expected namespace node"),
        };
        let trigger = api.namespace("ui").unwrap().procedure("trigger").unwrap();
        assert_eq!(trigger.path(), "api.ui.trigger");
    }

    #[test]
    fn unknown_segment_fails_eagerly_without_transport_traffic() {
        let (transport, client) = client();
        let math = client.root().namespace("math").unwrap();
        let err = math.get("subtract").unwrap_err();
        match err {
            RouteError::NotFound { path } => assert_eq!(path, "math.subtract"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn unknown_path_that_shares_a_prefix_still_fails() {
        let (_transport, client) = client();
        assert!(matches!(
            client.root().resolve("api.uix"),
            Err(RouteError::NotFound { .. })
        ));
        assert!(matches!(
            client.root().resolve("api.ui.nope"),
            Err(RouteError::NotFound { .. })
        ));
    }

    #[test]
    fn procedure_wins_tie_break_on_direct_access() {
        let (_transport, client) = client();
        assert!(matches!(
            client.root().get("status").unwrap(),
            RouteNode::Procedure(_)
        ));
    }

    #[test]
    fn dual_shape_name_still_descends_as_namespace() {
        let (_transport, client) = client();
        let detail = client
            .root()
            .namespace("status")
            .unwrap()
            .procedure("detail")
            .unwrap();
        assert_eq!(detail.path(), "status.detail");

        // The dotted-path resolver applies the same rule mid-path.
        assert!(matches!(
            client.root().resolve("status.detail").unwrap(),
            RouteNode::Procedure(_)
        ));
    }

    #[test]
    fn reserved_probe_segment_is_inert_at_every_depth() {
        let (_transport, client) = client();
        assert!(matches!(client.root().get("then").unwrap(), RouteNode::Inert));
        let math = client.root().namespace("math").unwrap();
        assert!(matches!(math.get("then").unwrap(), RouteNode::Inert));
    }

    #[test]
    fn typed_accessors_report_shape_mismatches() {
        let (_transport, client) = client();
        assert!(matches!(
            client.root().procedure("math"),
            Err(RouteError::NotAProcedure { .. })
        ));
        assert!(matches!(
            client.root().namespace("greet"),
            Err(RouteError::NotANamespace { .. })
        ));
    }

    #[tokio::test]
    async fn invoke_marshals_and_calls_exactly_once() {
        let (transport, client) = client();
        transport.respond("HostBridge__math.add", json!(5));

        let add = client.procedure("math.add").unwrap();
        let result = add
            .invoke(vec![json!(2).into(), json!(3).into()])
            .await
            .unwrap();

        assert_eq!(result, json!(5));
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "HostBridge__math.add");
        assert_eq!(Value::Object(calls[0].1.clone()), json!({"a": 2, "b": 3}));
    }

    #[tokio::test]
    async fn zero_parameter_invoke_sends_empty_object() {
        let (transport, client) = client();
        let ping = client.procedure("ping").unwrap();
        ping.invoke(vec![]).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].0, "HostBridge__ping");
        assert!(calls[0].1.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_propagates_unchanged() {
        let (transport, client) = client();
        transport.fail("HostBridge__greet", "host went away");

        let err = client
            .procedure("greet")
            .unwrap()
            .invoke(vec![json!("Ada").into()])
            .await
            .unwrap_err();
        match err {
            CallError::Transport(source) => {
                assert_eq!(source.to_string(), "host went away");
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn marshal_failure_never_reaches_the_transport() {
        let (transport, client) = client();
        let greet = client.procedure("greet").unwrap();
        let err = greet
            .invoke(vec![json!("Ada").into(), json!("extra").into()])
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::MissingParamName { .. }));
        assert_eq!(transport.call_count(), 0);
    }
}
