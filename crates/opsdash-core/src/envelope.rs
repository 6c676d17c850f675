//! Tagged success/failure envelope returned by every backend endpoint.
//!
//! Shape: `{ "result": "success" | other, <resource>: <payload>, "message": ... }`.
//! The payload field is named after the resource and is present iff the
//! result discriminant is success.

use crate::error::{CoreError, CoreResult};
use crate::resource::Resource;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Discriminant value marking a successful response.
const RESULT_SUCCESS: &str = "success";

/// A parsed backend response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Success/failure discriminant.
    pub result: String,
    /// Human-readable message, usually present on failure.
    #[serde(default)]
    pub message: Option<String>,
    /// Remaining fields, keyed by resource name on success.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Envelope {
    /// Whether the envelope carries the success discriminant.
    pub fn is_success(&self) -> bool {
        self.result == RESULT_SUCCESS
    }

    /// The carried message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Payload for a resource, looked up by its envelope field name.
    ///
    /// Returns `None` for failure envelopes or when the field is absent.
    pub fn payload(&self, resource: Resource) -> Option<&Value> {
        if !self.is_success() {
            return None;
        }
        self.extra.get(resource.payload_field())
    }

    /// Like [`payload`](Self::payload), but an absent field in a success
    /// envelope is an error the caller can log.
    pub fn require_payload(&self, resource: Resource) -> CoreResult<&Value> {
        self.payload(resource).ok_or(CoreError::MissingPayload {
            field: resource.payload_field(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Envelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_success_envelope_exposes_payload() {
        let env = parse(json!({
            "result": "success",
            "balances": [{"coin": "BTC"}]
        }));
        assert!(env.is_success());
        assert!(env.payload(Resource::Positions).is_some());
        assert!(env.payload(Resource::Signals).is_none());
        assert!(env.message().is_none());
    }

    #[test]
    fn test_failure_envelope_hides_payload() {
        let env = parse(json!({
            "result": "error",
            "message": "exchange unavailable",
            "balances": []
        }));
        assert!(!env.is_success());
        // Payload is only meaningful under the success discriminant.
        assert!(env.payload(Resource::Positions).is_none());
        assert_eq!(env.message(), Some("exchange unavailable"));
    }

    #[test]
    fn test_bare_success_envelope() {
        // Action endpoints may return just the discriminant.
        let env = parse(json!({"result": "success"}));
        assert!(env.is_success());
        assert!(env.payload(Resource::Status).is_none());
        assert!(matches!(
            env.require_payload(Resource::Status),
            Err(CoreError::MissingPayload { field: "status" })
        ));
    }
}
