//! Flat JSON wire codec.

use crate::message::Message;
use crate::{CLIENT_ID_KEY, FROM_CLIENT_ID_KEY, MESSAGE_CONTENT_KEY, TIME_KEY};
use serde_json::{Map, Value};
use thiserror::Error;

/// Maximum accepted frame size on either transport.
pub const MAX_FRAME_BYTES: usize = 64 * 1024;

/// Errors produced while decoding or encoding a wire frame.
#[derive(Debug, Error)]
pub enum WireError {
    /// The frame is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame is valid JSON but not an object.
    #[error("frame is not a JSON object")]
    NotAnObject,

    /// A known key carries a non-string value.
    #[error("field `{field}` must be a string")]
    InvalidField { field: &'static str },

    /// The frame exceeds [`MAX_FRAME_BYTES`].
    #[error("frame too large: {size} bytes")]
    FrameTooLarge { size: usize },
}

pub(crate) fn decode(raw: &str) -> Result<Message, WireError> {
    if raw.len() > MAX_FRAME_BYTES {
        return Err(WireError::FrameTooLarge { size: raw.len() });
    }

    let value: Value = serde_json::from_str(raw)?;
    let mut obj = match value {
        Value::Object(obj) => obj,
        _ => return Err(WireError::NotAnObject),
    };

    // Server-assigned keys are never trusted from the wire.
    obj.remove(TIME_KEY);
    obj.remove(FROM_CLIENT_ID_KEY);

    let client_id = take_string(&mut obj, CLIENT_ID_KEY)?;
    let content = take_string(&mut obj, MESSAGE_CONTENT_KEY)?;

    Ok(Message::from_wire(client_id, content, obj))
}

pub(crate) fn encode(message: &Message) -> Result<String, WireError> {
    serde_json::to_string(message).map_err(WireError::Json)
}

fn take_string(
    obj: &mut Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, WireError> {
    match obj.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(WireError::InvalidField { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_chat_frame() {
        let msg = Message::decode(r#"{"message":"hello","nickname":"alice"}"#).unwrap();
        assert_eq!(msg.content(), Some("hello"));
        assert!(msg.has_content());
        assert_eq!(
            msg.extra().get("nickname").and_then(|v| v.as_str()),
            Some("alice")
        );
    }

    #[test]
    fn test_decode_discards_server_keys() {
        let msg =
            Message::decode(r#"{"message":"hi","time":123,"fromClientId":"spoofed"}"#).unwrap();
        assert_eq!(msg.time(), None);
        assert_eq!(msg.from_client_id(), None);
    }

    #[test]
    fn test_decode_control_frame() {
        let msg = Message::decode(r#"{"clientId":"abc"}"#).unwrap();
        assert_eq!(msg.client_id(), Some("abc"));
        assert!(!msg.has_content());
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        assert!(matches!(
            Message::decode("not json"),
            Err(WireError::Json(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        assert!(matches!(
            Message::decode(r#"["a","b"]"#),
            Err(WireError::NotAnObject)
        ));
        assert!(matches!(
            Message::decode("42"),
            Err(WireError::NotAnObject)
        ));
    }

    #[test]
    fn test_decode_rejects_non_string_content() {
        assert!(matches!(
            Message::decode(r#"{"message":42}"#),
            Err(WireError::InvalidField { field: "message" })
        ));
    }

    #[test]
    fn test_decode_rejects_oversized_frame() {
        let raw = format!(r#"{{"message":"{}"}}"#, "x".repeat(MAX_FRAME_BYTES));
        assert!(matches!(
            Message::decode(&raw),
            Err(WireError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn test_encode_stamped_frame() {
        let msg = Message::chat("hello")
            .with_extra("nickname", "bob")
            .stamped("c1", "i1");

        let encoded = msg.encode().unwrap();
        assert!(encoded.contains(r#""message":"hello""#));
        assert!(encoded.contains(r#""fromClientId":"c1""#));
        assert!(encoded.contains(r#""time":"#));
        assert!(encoded.contains(r#""nickname":"bob""#));
        // The origin is bus-only metadata.
        assert!(!encoded.contains("i1"));
    }

    #[test]
    fn test_encode_omits_absent_fields() {
        let encoded = Message::assignment("abc").encode().unwrap();
        assert_eq!(encoded, r#"{"clientId":"abc"}"#);
    }

    #[test]
    fn test_extra_fields_round_trip() {
        let decoded =
            Message::decode(r#"{"message":"m","nickname":"alice","avatar":7}"#).unwrap();
        let encoded = decoded.encode().unwrap();
        assert!(encoded.contains(r#""nickname":"alice""#));
        assert!(encoded.contains(r#""avatar":7"#));
    }
}
