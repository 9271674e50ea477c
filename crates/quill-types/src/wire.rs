//! Named-event envelopes exchanged with the relay.
//!
//! Each message is one JSON object per line:
//!
//! ```text
//! {"event":"site_id","data":3}
//! {"event":"text_operations","data":[ <operation>, ... ]}
//! ```
//!
//! Operation payloads stay as raw JSON values here. The relay forwards them
//! untouched; only the receiving controller decodes them, so a malformed
//! operation is rejected where it would do damage and nowhere else.

use serde::{Deserialize, Serialize};

use crate::{SiteId, WireError};

/// Events the relay sends to a site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The identity this site must use for everything it inserts.
    SiteId(SiteId),
    /// An ordered batch of serialized operations from another site.
    TextOperations(Vec<serde_json::Value>),
}

/// Events a site sends to the relay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// An ordered batch of serialized operations produced locally.
    TextOperations(Vec<serde_json::Value>),
}

impl ServerMessage {
    /// Event name as it appears on the wire.
    pub fn event(&self) -> &'static str {
        match self {
            ServerMessage::SiteId(_) => "site_id",
            ServerMessage::TextOperations(_) => "text_operations",
        }
    }

    pub fn to_line(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_line(line: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(line)?)
    }
}

impl ClientMessage {
    pub fn event(&self) -> &'static str {
        match self {
            ClientMessage::TextOperations(_) => "text_operations",
        }
    }

    pub fn to_line(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_line(line: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(line)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_site_id_envelope() {
        let msg = ServerMessage::SiteId(SiteId::new(3));
        assert_eq!(msg.to_line().unwrap(), r#"{"event":"site_id","data":3}"#);
        assert_eq!(ServerMessage::from_line(r#"{"event":"site_id","data":3}"#).unwrap(), msg);
        assert_eq!(msg.event(), "site_id");
    }

    #[test]
    fn test_text_operations_envelope() {
        let line = r#"{"event":"text_operations","data":[{"anything":1}]}"#;
        let msg = ClientMessage::from_line(line).unwrap();
        assert_eq!(msg, ClientMessage::TextOperations(vec![json!({ "anything": 1 })]));
        assert_eq!(msg.event(), "text_operations");

        // Payload entries are opaque at this layer.
        let server = ServerMessage::from_line(line).unwrap();
        assert!(matches!(server, ServerMessage::TextOperations(ref ops) if ops.len() == 1));
    }

    #[test]
    fn test_unknown_event_rejected() {
        assert!(ServerMessage::from_line(r#"{"event":"cursor","data":1}"#).is_err());
        assert!(ClientMessage::from_line("not json").is_err());
    }
}
