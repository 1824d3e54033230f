use thiserror::Error;

/// Errors raised while decoding the manifest.
///
/// The manifest is produced by the host's code generator, so a decode failure
/// means the two halves of the bridge disagree about the wire format. It is
/// fatal at construction time: a client must not come up with a broken route
/// table.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A namespace value did not decode to `{procedure: [param, ...]}`.
    #[error("invalid manifest entry for namespace '{namespace}': {source}")]
    InvalidNamespace {
        namespace: String,
        #[source]
        source: serde_json::Error,
    },
}
