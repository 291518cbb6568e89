use serde::{Deserialize, Serialize};

use crate::room::models::{ChatMessage, PresenceState, ReadReceipt};

/// Events published to the subscribers of a room
///
/// Events represent facts about mutations that have already been applied
/// to the room. They are never persisted. Serialized, an event is the wire
/// envelope `{"event": "<name>", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A message was appended to the room
    MessageReceived(ChatMessage),

    /// A participant's presence was overwritten
    PresenceUpdated(PresenceState),

    /// A participant's last-read pointer moved forward
    ChatRead(ReadReceipt),
}

impl ChatEvent {
    /// Get the wire name of the event
    pub fn event_type(&self) -> &'static str {
        match self {
            ChatEvent::MessageReceived(_) => "message_received",
            ChatEvent::PresenceUpdated(_) => "presence_updated",
            ChatEvent::ChatRead(_) => "chat_read",
        }
    }

    /// Serializes the event into its wire envelope
    pub fn to_wire(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
