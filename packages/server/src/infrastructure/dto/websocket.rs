//! WebSocket frame DTOs.
//!
//! Every frame is a JSON object with an `event` name. Inbound events may
//! carry an `ack` id which the server echoes on the matching `ack` frame.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event names used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    SendMessage,
    Connected,
    MessageReceived,
    Ack,
}

/// Any inbound frame. `event` stays a string so unknown names can be
/// answered instead of failing the parse.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    pub event: String,
    #[serde(default)]
    pub ack: Option<u64>,
    #[serde(default)]
    pub data: Value,
}

/// Payload of the inbound `send_message` event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, rename = "type")]
    pub message_type: Option<String>,
    #[serde(default)]
    pub attachments: Option<Vec<Value>>,
}

/// Full persisted message record as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub body: Option<String>,
    pub attachments: Vec<Value>,
    #[serde(rename = "type")]
    pub message_type: String,
    pub status: String,
    /// RFC 3339 (UTC)
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedData {
    pub user_id: String,
    pub connection_id: String,
}

/// Greeting sent once a connection is admitted and registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectedEvent {
    pub event: EventName,
    pub data: ConnectedData,
}

/// Fan-out frame delivered to every online conversation member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageReceivedEvent {
    pub event: EventName,
    pub data: MessageDto,
}

/// Acknowledgement of an inbound event, sent only to the originating connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AckEvent {
    pub event: EventName,
    pub ack: Option<u64>,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<MessageDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectedEvent {
    pub fn new(user_id: String, connection_id: String) -> Self {
        Self {
            event: EventName::Connected,
            data: ConnectedData {
                user_id,
                connection_id,
            },
        }
    }
}

impl MessageReceivedEvent {
    pub fn new(data: MessageDto) -> Self {
        Self {
            event: EventName::MessageReceived,
            data,
        }
    }
}

impl AckEvent {
    pub fn success(ack: Option<u64>, data: MessageDto) -> Self {
        Self {
            event: EventName::Ack,
            ack,
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(ack: Option<u64>, reason: impl Into<String>) -> Self {
        Self {
            event: EventName::Ack,
            ack,
            ok: false,
            data: None,
            error: Some(reason.into()),
        }
    }
}
