//! Push channel wire format.
//!
//! Every frame is a JSON object `{ "event": <name>, "data": <payload> }`.
//! Inbound events consumed: `notification`, `positions`, `alerts`,
//! `refresh_data`. Outbound: `refresh { "type": <resource> }` asks the
//! backend to rebroadcast a resource outside the normal poll cadence.

use opsdash_core::Resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One named event frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushFrame {
    pub event: String,
    /// Event payload; `refresh_data` carries none.
    #[serde(default)]
    pub data: Value,
}

impl PushFrame {
    /// Parse an inbound text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Outbound `refresh { type }` request for a resource.
    pub fn refresh_request(resource: Resource) -> Self {
        Self {
            event: "refresh".to_string(),
            data: serde_json::json!({ "type": resource.as_str() }),
        }
    }

    /// Serialize for the wire.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
