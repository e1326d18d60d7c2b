use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Callback payload posted by Bandwidth.
///
/// Only `eventType` is interpreted; the rest of the document is handed to the
/// handler untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackEvent(Value);

impl CallbackEvent {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// Parses a request body. Returns `None` for empty or non-JSON bodies.
    pub fn from_slice(body: &[u8]) -> Option<Self> {
        if body.is_empty() {
            return None;
        }
        serde_json::from_slice(body).ok().map(Self)
    }

    /// The `eventType` field, when it is a string.
    pub fn event_type(&self) -> Option<&str> {
        self.0.get("eventType").and_then(Value::as_str)
    }

    /// Reads a top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }

    pub fn into_payload(self) -> Value {
        self.0
    }
}
