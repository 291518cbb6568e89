use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use uuid::Uuid;

use super::{
    errors::ChatError,
    models::{
        ChatMessage, ChatSummary, MessageKind, PresenceState, PresenceStatus, ReadMark,
        ReadReceipt,
    },
};

/// Authoritative in-memory record of one room
///
/// RoomState never publishes anything itself. Every successful mutation
/// returns the value the dispatcher needs to build the matching event.
#[derive(Debug, Clone)]
pub struct RoomState {
    id: String,
    participants: Vec<String>,
    messages: Vec<ChatMessage>,
    /// message id -> position in `messages`
    message_positions: HashMap<String, usize>,
    presence: HashMap<String, PresenceState>,
    /// user id -> position of the last message they read
    last_read: HashMap<String, usize>,
}

impl RoomState {
    /// Creates a room with a generated id
    ///
    /// Blank and duplicate ids are dropped. The bot is always added as a
    /// participant, but does not count towards the required human members.
    pub fn create(participants: Vec<String>, bot_user_id: &str) -> Result<Self, ChatError> {
        Self::with_id(Uuid::new_v4().to_string(), participants, bot_user_id)
    }

    pub fn with_id(
        id: String,
        participants: Vec<String>,
        bot_user_id: &str,
    ) -> Result<Self, ChatError> {
        let mut members: Vec<String> = Vec::with_capacity(participants.len() + 1);
        for participant in participants {
            let participant = participant.trim().to_string();
            if participant.is_empty()
                || participant == bot_user_id
                || members.contains(&participant)
            {
                continue;
            }
            members.push(participant);
        }

        if members.is_empty() {
            return Err(ChatError::InvalidParticipants(
                "at least one participant besides the bot is required".to_string(),
            ));
        }
        members.push(bot_user_id.to_string());

        let now = Utc::now();
        let presence = members
            .iter()
            .map(|user_id| {
                (
                    user_id.clone(),
                    PresenceState {
                        user_id: user_id.clone(),
                        status: PresenceStatus::Offline,
                        last_seen: now,
                    },
                )
            })
            .collect();

        debug!(room_id = %id, participants = ?members, "Room state created");

        Ok(Self {
            id,
            participants: members,
            messages: Vec::new(),
            message_positions: HashMap::new(),
            presence,
            last_read: HashMap::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn summary(&self) -> ChatSummary {
        ChatSummary {
            chat_id: self.id.clone(),
            participants: self.participants.clone(),
        }
    }

    /// Appends a message authored by a participant
    ///
    /// Ids are UUID v7, so they sort in append order.
    pub fn add_message(
        &mut self,
        author_id: &str,
        kind: MessageKind,
        content: &str,
    ) -> Result<ChatMessage, ChatError> {
        self.ensure_participant(author_id)?;
        validate_content(kind, content)?;

        let message = ChatMessage {
            id: Uuid::now_v7().to_string(),
            user_id: author_id.to_string(),
            kind,
            content: content.to_string(),
            timestamp: self.next_timestamp(),
        };

        self.message_positions
            .insert(message.id.clone(), self.messages.len());
        self.messages.push(message.clone());

        Ok(message)
    }

    /// Overwrites a participant's presence; last writer wins
    ///
    /// Going offline refreshes `last_seen`, other statuses keep it.
    pub fn set_presence(
        &mut self,
        user_id: &str,
        status: PresenceStatus,
    ) -> Result<PresenceState, ChatError> {
        self.ensure_participant(user_id)?;

        let previous_seen = self.presence.get(user_id).map(|p| p.last_seen);
        let last_seen = match (status, previous_seen) {
            (PresenceStatus::Offline, _) | (_, None) => Utc::now(),
            (_, Some(seen)) => seen,
        };

        let state = PresenceState {
            user_id: user_id.to_string(),
            status,
            last_seen,
        };
        self.presence.insert(user_id.to_string(), state.clone());
        Ok(state)
    }

    /// Moves a participant's last-read pointer forward
    ///
    /// `None` means the latest message. The pointer never moves backwards:
    /// the same or an older message leaves it untouched.
    pub fn mark_read(
        &mut self,
        user_id: &str,
        message_id: Option<&str>,
    ) -> Result<ReadMark, ChatError> {
        self.ensure_participant(user_id)?;

        let target = match message_id {
            Some(id) => Some(*self.message_positions.get(id).ok_or_else(|| {
                ChatError::MessageNotFound {
                    chat_id: self.id.clone(),
                    message_id: id.to_string(),
                }
            })?),
            None => self.messages.len().checked_sub(1),
        };

        let current = self.last_read.get(user_id).copied();
        match target {
            Some(position) if current.map_or(true, |c| position > c) => {
                self.last_read.insert(user_id.to_string(), position);
                Ok(ReadMark::Advanced(self.receipt_for(user_id)))
            }
            _ => Ok(ReadMark::Unchanged(self.receipt_for(user_id))),
        }
    }

    pub fn presence(&self) -> Vec<PresenceState> {
        self.participants
            .iter()
            .filter_map(|p| self.presence.get(p).cloned())
            .collect()
    }

    pub fn read_receipts(&self) -> BTreeMap<String, Option<String>> {
        self.participants
            .iter()
            .map(|p| (p.clone(), self.last_read_message_id(p)))
            .collect()
    }

    fn receipt_for(&self, user_id: &str) -> ReadReceipt {
        ReadReceipt {
            chat_id: self.id.clone(),
            user_id: user_id.to_string(),
            last_read_message_id: self.last_read_message_id(user_id),
        }
    }

    fn last_read_message_id(&self, user_id: &str) -> Option<String> {
        self.last_read
            .get(user_id)
            .and_then(|&position| self.messages.get(position))
            .map(|m| m.id.clone())
    }

    fn ensure_participant(&self, user_id: &str) -> Result<(), ChatError> {
        if self.has_participant(user_id) {
            Ok(())
        } else {
            Err(ChatError::InvalidAuthor {
                chat_id: self.id.clone(),
                user_id: user_id.to_string(),
            })
        }
    }

    /// Wall clock, clamped so timestamps never go backwards within the room
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.messages.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        }
    }
}

fn validate_content(kind: MessageKind, content: &str) -> Result<(), ChatError> {
    match kind {
        MessageKind::Text if content.trim().is_empty() => Err(ChatError::InvalidContent(
            "text message must not be empty".to_string(),
        )),
        MessageKind::Image | MessageKind::Audio
            if content.is_empty() || content.chars().any(char::is_whitespace) =>
        {
            Err(ChatError::InvalidContent(format!(
                "{kind} message requires a media reference"
            )))
        }
        _ => Ok(()),
    }
}
