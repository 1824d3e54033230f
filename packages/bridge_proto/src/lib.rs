//! Wire contract for the host bridge.
//!
//! The bridge connects a UI process to its host process over a transport
//! with exactly two primitives: a request/response call addressed by string
//! command name carrying a JSON payload, and a single named broadcast
//! channel for host→UI pushes. This crate holds the pieces both halves must
//! agree on:
//!
//! - [`Manifest`] — which procedures exist at which namespace paths, and
//!   their positional parameter names
//! - [`EventEnvelope`] — the wrapper around one pushed event, keyed by
//!   fully-qualified procedure path
//! - [`wire`] — the command prefix, setup command, and broadcast channel
//!   name
//!
//! The client half that consumes this contract lives in `bridge_client`.

pub mod envelope;
pub mod error;
pub mod manifest;
pub mod wire;

pub use envelope::{EventBody, EventEnvelope};
pub use error::ManifestError;
pub use manifest::{Manifest, ManifestSource, ParamNames, split_leaf};
