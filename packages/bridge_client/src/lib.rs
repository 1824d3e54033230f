//! Client half of the typed UI↔host RPC bridge.
//!
//! The host declares a hierarchy of namespaced procedures and ships a
//! manifest describing it (see `bridge_proto`); the transport between the
//! two processes offers only a request/response call by command name and a
//! single broadcast channel for pushed events. This crate turns those two
//! primitives into a callable surface:
//!
//! - **Route resolution** — the namespace hierarchy is walked lazily,
//!   segment by segment, straight off the manifest; typos fail at the
//!   access site, before any transport traffic.
//! - **Argument marshalling** — positional arguments are zipped with the
//!   manifest's parameter names into the named object the transport
//!   expects; a callback argument becomes a streaming-channel handle.
//! - **Event demultiplexing** — one broadcast subscription per client,
//!   routed to per-procedure listeners by fully-qualified path, in arrival
//!   order.
//! - **Listener lifecycle** — identity-tagged registrations with idempotent
//!   disposers.
//!
//! # Example
//!
//! ```rust,no_run
//! use bridge_client::{BridgeClient, CallArg, Transport};
//! use serde_json::json;
//!
//! async fn demo<T: Transport>(transport: T) -> anyhow::Result<()> {
//!     // Fetches the manifest and opens the event channel.
//!     let client = BridgeClient::connect(transport).await?;
//!
//!     // Request/response.
//!     let sum = client
//!         .procedure("math.add")?
//!         .invoke(vec![CallArg::from(json!(2)), CallArg::from(json!(3))])
//!         .await?;
//!     println!("sum = {sum}");
//!
//!     // Pushed events.
//!     let handle = client
//!         .on("events.state_changed", |args| println!("state: {args:?}"))
//!         .await?;
//!     handle.unsubscribe();
//!     Ok(())
//! }
//! ```
//!
//! Concrete transports implement [`Transport`] and live with the embedding
//! application; this crate never touches a socket or webview itself.

mod client;
mod error;
mod events;
mod marshal;
mod registry;
mod router;
mod transport;

#[cfg(test)]
mod test_support;

pub use client::BridgeClient;
pub use error::{CallError, ConnectError, RouteError, SubscribeError};
pub use marshal::CallArg;
pub use registry::{EventCallback, ListenerHandle, ListenerRegistry};
pub use router::{NamespaceNode, ProcedureNode, RouteNode};
pub use transport::{StreamSink, Transport};

pub use bridge_proto::{EventBody, EventEnvelope, Manifest, ManifestError, ManifestSource, wire};
