//! Well-known wire names shared by both halves of the bridge.

/// Prefix prepended to a fully-qualified procedure path to form the outbound
/// command identifier, keeping bridge commands out of the host's plain
/// command namespace.
pub const CALL_PREFIX: &str = "HostBridge__";

/// One-time request/response command returning the serialized manifest.
pub const SETUP_COMMAND: &str = "HostBridge__setup";

/// The single broadcast channel carrying every pushed event.
pub const EVENT_CHANNEL: &str = "hostbridge_event";

/// Outbound command identifier for a fully-qualified procedure path.
pub fn command_for(path: &str) -> String {
    format!("{CALL_PREFIX}{path}")
}
