use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Kind of payload a chat message carries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Audio,
}

/// Presence status of a participant within one room
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
    Typing,
}

/// An immutable message appended to a room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String, // Text payload or media reference
    pub timestamp: DateTime<Utc>,
}

/// Latest presence of one participant; overwritten on every update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresenceState {
    pub user_id: String,
    pub status: PresenceStatus,
    pub last_seen: DateTime<Utc>,
}

/// Last-read pointer of one participant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadReceipt {
    pub chat_id: String,
    pub user_id: String,
    pub last_read_message_id: Option<String>,
}

/// Room listing entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatSummary {
    pub chat_id: String,
    pub participants: Vec<String>,
}

/// Outcome of a mark-read request
#[derive(Debug, Clone, PartialEq)]
pub enum ReadMark {
    /// The pointer moved forward; a `chat_read` event must be published
    Advanced(ReadReceipt),
    /// Same or older message, or nothing to read; state untouched
    Unchanged(ReadReceipt),
}

impl ReadMark {
    pub fn receipt(&self) -> &ReadReceipt {
        match self {
            ReadMark::Advanced(receipt) | ReadMark::Unchanged(receipt) => receipt,
        }
    }

    pub fn into_receipt(self) -> ReadReceipt {
        match self {
            ReadMark::Advanced(receipt) | ReadMark::Unchanged(receipt) => receipt,
        }
    }

    pub fn is_advanced(&self) -> bool {
        matches!(self, ReadMark::Advanced(_))
    }
}
