use thiserror::Error;

/// Validation failures returned synchronously to the caller of the hub
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("Chat not found: {0}")]
    RoomNotFound(String),

    #[error("Invalid participants: {0}")]
    InvalidParticipants(String),

    #[error("User {user_id} is not a participant in chat {chat_id}")]
    InvalidAuthor { chat_id: String, user_id: String },

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Message {message_id} not found in chat {chat_id}")]
    MessageNotFound { chat_id: String, message_id: String },
}
