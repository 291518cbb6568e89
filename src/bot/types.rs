use async_trait::async_trait;

use crate::room::{
    errors::ChatError,
    models::{ChatMessage, MessageKind, PresenceState, PresenceStatus, ReadMark},
};

/// A canned bot reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotReply {
    pub kind: MessageKind,
    pub content: &'static str,
}

/// Replies the bot picks from at random
pub const BOT_REPLIES: &[BotReply] = &[
    BotReply {
        kind: MessageKind::Text,
        content: "Interesting...",
    },
    BotReply {
        kind: MessageKind::Text,
        content: "Tell me more!",
    },
    BotReply {
        kind: MessageKind::Text,
        content: "Got it!",
    },
    BotReply {
        kind: MessageKind::Image,
        content: "http://example.com/image.png",
    },
    BotReply {
        kind: MessageKind::Audio,
        content: "http://example.com/audio.mp3",
    },
];

/// The mutation path the bot acts through
///
/// Implemented by the dispatcher so bot activity goes through the same
/// mutate-then-publish path as any human participant.
#[async_trait]
pub trait BotActions: Send + Sync {
    async fn send_message(
        &self,
        room_id: &str,
        user_id: &str,
        kind: MessageKind,
        content: &str,
    ) -> Result<ChatMessage, ChatError>;

    async fn set_presence(
        &self,
        room_id: &str,
        user_id: &str,
        status: PresenceStatus,
    ) -> Result<PresenceState, ChatError>;

    async fn mark_read(
        &self,
        room_id: &str,
        user_id: &str,
        message_id: Option<&str>,
    ) -> Result<ReadMark, ChatError>;
}
