use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::models::{ChatMessage, MessageKind, PresenceStatus};

/// Request payload for creating a new chat
#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    pub participants: Vec<String>,
}

/// Request payload for posting a message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub status: String,
    pub message: ChatMessage,
}

/// Request payload for a presence update
#[derive(Debug, Deserialize)]
pub struct PresenceUpdateRequest {
    pub user_id: String,
    pub status: PresenceStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresenceUpdateResponse {
    pub chat_id: String,
    pub user_id: String,
    pub status: PresenceStatus,
    pub last_seen: DateTime<Utc>,
}

/// Request payload for marking a chat read
///
/// Without a message id the latest message is marked.
#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub user_id: String,
    #[serde(default)]
    pub message_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadReceiptsResponse {
    pub chat_id: String,
    pub read_receipts: BTreeMap<String, Option<String>>,
}
