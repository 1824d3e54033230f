use bridge_proto::ManifestError;
use thiserror::Error;

/// Route resolution failures. Raised eagerly at the access site, before any
/// transport traffic, so a typo surfaces where it was written.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The path names neither a declared procedure nor a namespace.
    #[error("procedure or namespace not found at '{path}'")]
    NotFound { path: String },
    /// The path exists but only as a namespace; it cannot be invoked.
    #[error("'{path}' is a namespace, not a callable procedure")]
    NotAProcedure { path: String },
    /// The path exists but only as a procedure; nothing is declared beneath it.
    #[error("'{path}' is a procedure, not a namespace")]
    NotANamespace { path: String },
}

/// Failures of a single outbound call.
#[derive(Debug, Error)]
pub enum CallError {
    /// The manifest declares fewer parameter names than the caller supplied
    /// arguments. The two halves of the bridge were generated from different
    /// declarations; sending a partial payload would mask that, so the call
    /// is refused before it reaches the transport.
    #[error("no parameter name at position {index} of '{path}'")]
    MissingParamName { path: String, index: usize },
    /// The underlying transport rejected the call. Propagated unchanged.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Failures while registering an event listener.
#[derive(Debug, Error)]
pub enum SubscribeError {
    /// The path does not name a declared procedure.
    #[error("cannot listen on '{path}': not a declared procedure")]
    UnknownProcedure { path: String },
    /// Establishing the shared broadcast subscription failed. Propagated
    /// unchanged.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Failures of asynchronous client construction.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The setup call answered with something other than a JSON string.
    #[error("setup response was not a JSON string")]
    SetupNotAString,
    /// The setup string did not decode to a namespace→manifest map.
    #[error("malformed setup response: {0}")]
    InvalidSetup(#[source] serde_json::Error),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    /// The setup call or the broadcast subscription failed. Propagated
    /// unchanged.
    #[error(transparent)]
    Transport(anyhow::Error),
}
