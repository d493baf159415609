//! Data types for the PysonDB-KV client

use serde_json::{Map, Value};

/// One stored item as the caller defines it: an opaque JSON object.
///
/// The client passes records through untouched; the field shape is a
/// contract between the caller and the server.
pub type Record = Map<String, Value>;

/// Body of a successful (HTTP 200) response.
///
/// The service declares `Content-Type: application/json` for structured
/// results and answers plain text for acknowledgements such as
/// `"Item deleted successfully"`. A body declared as JSON that fails to
/// parse is handed back as text instead of failing the call.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Parsed `application/json` body
    Json(Value),
    /// Any other body, returned verbatim
    Text(String),
}

impl Payload {
    /// The parsed JSON value, if this payload is structured.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    /// Consume the payload, yielding the JSON value if structured.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    /// The raw text, if this payload is unstructured.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Json(_) => None,
            Payload::Text(text) => Some(text),
        }
    }

    /// Consume the payload, yielding the text if unstructured.
    pub fn into_text(self) -> Option<String> {
        match self {
            Payload::Json(_) => None,
            Payload::Text(text) => Some(text),
        }
    }

    /// The server-assigned `"key"` field, if this payload is a JSON object
    /// carrying one.
    ///
    /// The add endpoint reports the key of the stored record this way.
    pub fn key(&self) -> Option<&str> {
        match self {
            Payload::Json(Value::Object(map)) => map.get("key").and_then(Value::as_str),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_json_accessors() {
        let payload = Payload::Json(json!({"name": "Alice"}));
        assert!(payload.as_json().is_some());
        assert!(payload.as_text().is_none());
        assert_eq!(payload.into_json(), Some(json!({"name": "Alice"})));
    }

    #[test]
    fn test_payload_text_accessors() {
        let payload = Payload::Text("OK".to_string());
        assert!(payload.as_json().is_none());
        assert_eq!(payload.as_text(), Some("OK"));
        assert_eq!(payload.into_text(), Some("OK".to_string()));
    }

    #[test]
    fn test_payload_key_from_object() {
        let payload = Payload::Json(json!({"key": "abc123", "name": "Alice"}));
        assert_eq!(payload.key(), Some("abc123"));
    }

    #[test]
    fn test_payload_key_absent() {
        assert_eq!(Payload::Json(json!({"name": "Alice"})).key(), None);
        assert_eq!(Payload::Json(json!(["a", "b"])).key(), None);
        assert_eq!(Payload::Json(json!({"key": 42})).key(), None);
        assert_eq!(Payload::Text("Item deleted successfully".to_string()).key(), None);
    }
}
