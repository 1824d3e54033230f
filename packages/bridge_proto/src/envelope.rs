//! Wire wrapper for events pushed from the host over the shared broadcast
//! channel. All procedures share one channel; the envelope's `event_name`
//! carries the fully-qualified path used to route to the right listener.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One pushed event. Owned transiently by the dispatcher; never retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Fully-qualified dotted procedure path — the routing key.
    pub event_name: String,
    pub event: EventBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBody {
    /// Leaf procedure name (last segment of `event_name`).
    pub proc_name: String,
    /// Raw payload; `null` for zero-argument events, an array for
    /// multi-argument events.
    #[serde(default)]
    pub input_type: Value,
}
