//! Agent reply envelopes.
//!
//! Every reply is a JSON object carrying a single `value` field:
//!
//! Success:
//! ```json
//! { "sessionId": "...", "value": "some text" }
//! ```
//!
//! Remote failure:
//! ```json
//! {
//!   "sessionId": "...",
//!   "value": {
//!     "error": "no such element",
//!     "message": "An element could not be located on the page using the given search parameters",
//!     "stacktrace": "..."
//!   }
//! }
//! ```
//!
//! Decoding is two-phase: the executor validates transport status and
//! remote failures, then callers decode `value` into the shape they expect.

// ============================================================================
// Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::ElementId;

// ============================================================================
// Constants
// ============================================================================

/// Legacy JSON wire protocol element key.
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// W3C element key.
pub const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

// ============================================================================
// Envelope
// ============================================================================

/// The `{value: T}` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Command-specific payload.
    pub value: T,
}

/// Remote failure payload carried in `value`.
#[derive(Debug, Clone, Deserialize)]
struct RemoteFailure {
    error: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    stacktrace: Option<String>,
}

// ============================================================================
// RawReply
// ============================================================================

/// Raw reply body of a successful exchange.
///
/// Produced by the executor after transport and remote-error validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReply(Vec<u8>);

impl RawReply {
    /// Wraps a reply body.
    #[inline]
    #[must_use]
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self(body.into())
    }

    /// Returns the raw body bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decodes `value` into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the body does not match `{value: T}`.
    pub fn value<T: DeserializeOwned>(&self) -> Result<T> {
        let envelope: Envelope<T> = serde_json::from_slice(&self.0)?;
        Ok(envelope.value)
    }

    /// Decodes `value` as a string.
    ///
    /// A `null` value is the agent's way of saying "no value" and decodes
    /// to an empty string. Any other non-string shape is a decode error.
    pub fn value_string(&self) -> Result<String> {
        let value: Option<String> = self.value()?;
        Ok(value.unwrap_or_default())
    }

    /// Decodes a base64 `value` into raw bytes.
    pub fn value_base64(&self) -> Result<Vec<u8>> {
        let encoded: String = self.value()?;
        // Some agent builds wrap the payload at 76 columns.
        let compact: String = encoded.split_whitespace().collect();
        Ok(Base64Standard.decode(compact)?)
    }

    /// Decodes `value` as a single element reference.
    ///
    /// Returns `None` when the reply carries no element identifier.
    pub fn value_element(&self) -> Result<Option<ElementId>> {
        let value: Value = self.value()?;
        Ok(element_id_from_value(&value))
    }

    /// Decodes `value` as a list of element references.
    pub fn value_elements(&self) -> Result<Vec<ElementId>> {
        let values: Option<Vec<Value>> = self.value()?;
        Ok(values
            .unwrap_or_default()
            .iter()
            .filter_map(element_id_from_value)
            .collect())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Extracts a remote failure from a reply body, if present.
///
/// Returns `None` for bodies that are not JSON or whose `value` is not an
/// error object, so successful-empty values never look like failures.
#[must_use]
pub fn remote_error(body: &[u8]) -> Option<Error> {
    let envelope: Envelope<Value> = serde_json::from_slice(body).ok()?;
    let failure: RemoteFailure = serde_json::from_value(envelope.value).ok()?;
    if failure.error.is_empty() {
        return None;
    }

    let message = failure.message.unwrap_or_else(|| failure.error.clone());
    Some(Error::remote(failure.error, message, failure.stacktrace))
}

/// Reads an element identifier from either the legacy or the W3C key.
#[must_use]
pub fn element_id_from_value(value: &Value) -> Option<ElementId> {
    [LEGACY_ELEMENT_KEY, W3C_ELEMENT_KEY]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .find(|id| !id.is_empty())
        .map(ElementId::new)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::geometry::{Point, Rect, Size};

    #[test]
    fn test_value_string() {
        let reply = RawReply::new(r#"{"sessionId":"s1","value":"Login"}"#);
        assert_eq!(reply.value_string().expect("decode"), "Login");
    }

    #[test]
    fn test_empty_string_is_success() {
        let reply = RawReply::new(r#"{"value":""}"#);
        assert_eq!(reply.value_string().expect("decode"), "");
        assert!(remote_error(reply.as_bytes()).is_none());
    }

    #[test]
    fn test_null_string_is_empty() {
        let reply = RawReply::new(r#"{"value":null}"#);
        assert_eq!(reply.value_string().expect("decode"), "");
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        let reply = RawReply::new(r#"{"value":{"width":1}}"#);
        let err = reply.value_string().unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_missing_envelope_is_decode_error() {
        let reply = RawReply::new("<html>gateway</html>");
        assert!(reply.value::<Size>().unwrap_err().is_decode_error());
    }

    #[test]
    fn test_value_rect() {
        let reply = RawReply::new(r#"{"value":{"x":10,"y":20,"width":30,"height":40}}"#);
        let rect: Rect = reply.value().expect("decode");
        assert_eq!(rect, Rect::new(Point::new(10, 20), Size::new(30, 40)));
    }

    #[test]
    fn test_value_base64() {
        let reply = RawReply::new(r#"{"value":"aGVs\nbG8="}"#);
        assert_eq!(reply.value_base64().expect("decode"), b"hello".to_vec());
    }

    #[test]
    fn test_remote_error_detected() {
        let body = br#"{"value":{"error":"stale element reference","message":"gone","stacktrace":"at ..."}}"#;
        let err = remote_error(body).expect("remote error");
        match err {
            Error::Remote {
                error,
                message,
                stacktrace,
            } => {
                assert_eq!(error, "stale element reference");
                assert_eq!(message, "gone");
                assert_eq!(stacktrace.as_deref(), Some("at ..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_remote_error_ignores_plain_values() {
        assert!(remote_error(br#"{"value":{"width":1,"height":2}}"#).is_none());
        assert!(remote_error(br#"{"value":"error"}"#).is_none());
        assert!(remote_error(b"not json").is_none());
    }

    #[test]
    fn test_element_id_legacy_and_w3c() {
        let legacy = RawReply::new(r#"{"value":{"ELEMENT":"e-1"}}"#);
        assert_eq!(
            legacy.value_element().expect("decode"),
            Some(ElementId::new("e-1"))
        );

        let w3c = RawReply::new(
            r#"{"value":{"element-6066-11e4-a52e-4f735466cecf":"e-2"}}"#,
        );
        assert_eq!(w3c.value_element().expect("decode"), Some(ElementId::new("e-2")));

        let empty = RawReply::new(r#"{"value":{}}"#);
        assert_eq!(empty.value_element().expect("decode"), None);
    }

    #[test]
    fn test_value_elements() {
        let reply = RawReply::new(r#"{"value":[{"ELEMENT":"a"},{"ELEMENT":"b"}]}"#);
        let ids = reply.value_elements().expect("decode");
        assert_eq!(ids, vec![ElementId::new("a"), ElementId::new("b")]);
    }
}
