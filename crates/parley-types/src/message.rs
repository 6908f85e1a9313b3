//! The canonical chat message value type.

use crate::wire::{self, WireError};
use serde::Serialize;
use serde_json::{Map, Value};

/// Unique identifier for a connected client.
pub type ClientId = String;

/// Unique identifier for a transport front-end instance.
pub type InstanceId = String;

/// One chat event plus protocol metadata.
///
/// A `Message` is immutable once constructed: the stamping operations consume
/// the value and return a new one. Server-assigned fields (`time`,
/// `fromClientId`, the bus-only origin) are only ever set by the receiving
/// front-end and are discarded when present on inbound frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Message {
    /// Target of an id-assignment notice, or the sender on later frames.
    #[serde(rename = "clientId", skip_serializing_if = "Option::is_none")]
    client_id: Option<ClientId>,

    /// The textual chat payload. Absent on control frames.
    #[serde(rename = "message", skip_serializing_if = "Option::is_none")]
    content: Option<String>,

    /// Epoch millis, set server-side when the front-end stamps the frame.
    #[serde(rename = "time", skip_serializing_if = "Option::is_none")]
    time: Option<u64>,

    /// Id of the originating connection, set server-side.
    #[serde(rename = "fromClientId", skip_serializing_if = "Option::is_none")]
    from_client_id: Option<ClientId>,

    /// Front-end instance that first produced this message. Bus-only; never
    /// serialized. Used to suppress re-delivery through the instance that
    /// already broadcast the message locally.
    #[serde(skip)]
    origin: Option<InstanceId>,

    /// Unknown wire keys (display fields such as `nickname`), passed through
    /// opaquely.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Message {
    /// Builds the id-assignment control frame sent to a client on connect.
    pub fn assignment(client_id: impl Into<ClientId>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            ..Self::default()
        }
    }

    /// Builds an error reply carrying only a content field.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Self::default()
        }
    }

    /// Builds a content-bearing message, for clients and tests.
    pub fn chat(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Self::default()
        }
    }

    pub(crate) fn from_wire(
        client_id: Option<ClientId>,
        content: Option<String>,
        extra: Map<String, Value>,
    ) -> Self {
        Self {
            client_id,
            content,
            time: None,
            from_client_id: None,
            origin: None,
            extra,
        }
    }

    /// Decodes a single wire frame.
    ///
    /// Client-supplied values for the server-assigned keys are discarded.
    pub fn decode(raw: &str) -> Result<Self, WireError> {
        wire::decode(raw)
    }

    /// Encodes this message as one flat JSON object.
    pub fn encode(&self) -> Result<String, WireError> {
        wire::encode(self)
    }

    /// Stamps the server-assigned fields: sender id, current time, and the
    /// originating front-end instance.
    pub fn stamped(mut self, sender: &str, origin: &str) -> Self {
        self.from_client_id = Some(sender.to_string());
        self.time = Some(epoch_millis());
        self.origin = Some(origin.to_string());
        self
    }

    /// Attaches an opaque display field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// True iff the content field is present and non-empty. Gates whether the
    /// message is broadcast, published, and stored at all.
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn time(&self) -> Option<u64> {
        self.time
    }

    pub fn from_client_id(&self) -> Option<&str> {
        self.from_client_id.as_deref()
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

fn epoch_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_is_control_frame() {
        let msg = Message::assignment("abc");
        assert_eq!(msg.client_id(), Some("abc"));
        assert!(!msg.has_content());
    }

    #[test]
    fn test_empty_content_is_not_content() {
        let msg = Message::chat("");
        assert!(!msg.has_content());
        assert!(Message::chat("hi").has_content());
    }

    #[test]
    fn test_stamping_sets_server_fields() {
        let msg = Message::chat("hello").stamped("client-1", "instance-1");

        assert_eq!(msg.from_client_id(), Some("client-1"));
        assert_eq!(msg.origin(), Some("instance-1"));
        assert!(msg.time().is_some());
    }

    #[test]
    fn test_extra_fields_pass_through() {
        let msg = Message::chat("hello").with_extra("nickname", "alice");
        assert_eq!(
            msg.extra().get("nickname").and_then(|v| v.as_str()),
            Some("alice")
        );
    }
}
