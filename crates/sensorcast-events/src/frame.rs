//! JSON envelopes exchanged over the real-time channel.
//!
//! Every text frame, in either direction, is `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A frame sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFrame {
    /// Inbound event name.
    pub event: String,
    /// Event payload. Absent for events that take none.
    #[serde(default)]
    pub data: Option<Value>,
}

impl ClientFrame {
    /// Build a frame from an event name and payload.
    pub fn new(event: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// A frame sent by the server, either broadcast or as a direct reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerFrame {
    /// Outbound event name (may embed a sensor ID as a pseudo-topic).
    pub event: String,
    /// Event payload.
    pub data: Value,
}

impl ServerFrame {
    /// Encode the frame as a JSON text message.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the payload cannot be encoded.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
