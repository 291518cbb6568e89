use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::{
    bot::{BotActions, BotResponder},
    config::HubConfig,
    event::{ChatEvent, EventBus, Subscription},
    room::{
        errors::ChatError,
        models::{
            ChatMessage, ChatSummary, MessageKind, PresenceState, PresenceStatus, ReadMark,
        },
        state::RoomState,
    },
};

/// Everything the hub keeps for one room
struct RoomEntry {
    state: Mutex<RoomState>,
    bus: Arc<EventBus>,
    bot: BotResponder,
}

impl RoomEntry {
    /// Publishes an event for a mutation already applied to `state`
    ///
    /// Callers hold the room's state lock, so publishes for one room are
    /// totally ordered.
    fn publish(&self, event: ChatEvent) {
        self.bus.publish(event.clone());
        self.bot.observe(&event);
    }
}

struct DispatcherInner {
    config: HubConfig,
    rooms: RwLock<HashMap<String, Arc<RoomEntry>>>,
}

/// Single entry point of the hub
///
/// Owns every room's state, event bus and bot. Each operation applies its
/// mutation under the room's lock and publishes the matching event before
/// releasing it. Different rooms never contend on a shared lock on the hot
/// path; the room map is only written by `create_chat` and `shutdown`.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    pub fn new(config: HubConfig) -> Self {
        info!(
            subscriber_buffer = config.subscriber_buffer,
            bot_user_id = %config.bot.user_id,
            bot_min_delay_ms = config.bot.min_delay.as_millis() as u64,
            bot_max_delay_ms = config.bot.max_delay.as_millis() as u64,
            "Creating dispatcher"
        );
        Self {
            inner: Arc::new(DispatcherInner {
                config,
                rooms: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    pub fn bot_user_id(&self) -> &str {
        &self.inner.config.bot.user_id
    }

    /// Creates a room; the bot joins every room
    #[instrument(skip(self))]
    pub async fn create_chat(&self, participants: Vec<String>) -> Result<ChatSummary, ChatError> {
        let state = RoomState::create(participants, self.bot_user_id())?;
        let summary = state.summary();
        let room_id = summary.chat_id.clone();

        let entry = Arc::new(RoomEntry {
            bus: EventBus::new(room_id.clone(), self.inner.config.subscriber_buffer),
            bot: BotResponder::new(
                room_id.clone(),
                self.inner.config.bot.clone(),
                Arc::new(self.downgrade()),
            ),
            state: Mutex::new(state),
        });

        self.inner.rooms.write().await.insert(room_id.clone(), entry);

        info!(
            room_id = %room_id,
            participants = ?summary.participants,
            "Chat created"
        );
        Ok(summary)
    }

    pub async fn list_chats(&self) -> Vec<ChatSummary> {
        let entries: Vec<Arc<RoomEntry>> =
            self.inner.rooms.read().await.values().cloned().collect();

        let mut chats = Vec::with_capacity(entries.len());
        for entry in entries {
            chats.push(entry.state.lock().await.summary());
        }
        debug!(chat_count = chats.len(), "Chats listed");
        chats
    }

    pub async fn chat_exists(&self, room_id: &str) -> bool {
        self.inner.rooms.read().await.contains_key(room_id)
    }

    pub async fn get_messages(&self, room_id: &str) -> Result<Vec<ChatMessage>, ChatError> {
        let entry = self.room(room_id).await?;
        let state = entry.state.lock().await;
        Ok(state.messages().to_vec())
    }

    pub async fn get_presence(&self, room_id: &str) -> Result<Vec<PresenceState>, ChatError> {
        let entry = self.room(room_id).await?;
        let state = entry.state.lock().await;
        Ok(state.presence())
    }

    pub async fn get_read_receipts(
        &self,
        room_id: &str,
    ) -> Result<BTreeMap<String, Option<String>>, ChatError> {
        let entry = self.room(room_id).await?;
        let state = entry.state.lock().await;
        Ok(state.read_receipts())
    }

    /// Appends a message and publishes `message_received`
    ///
    /// A message from anyone but the bot may schedule a bot reply.
    #[instrument(skip(self, content))]
    pub async fn send_message(
        &self,
        room_id: &str,
        user_id: &str,
        kind: MessageKind,
        content: &str,
    ) -> Result<ChatMessage, ChatError> {
        let entry = self.room(room_id).await?;
        let mut state = entry.state.lock().await;

        let message = state.add_message(user_id, kind, content)?;
        entry.publish(ChatEvent::MessageReceived(message.clone()));

        debug!(
            room_id = %room_id,
            message_id = %message.id,
            kind = %kind,
            "Message sent"
        );
        Ok(message)
    }

    /// Overwrites presence and publishes `presence_updated`
    #[instrument(skip(self))]
    pub async fn set_presence(
        &self,
        room_id: &str,
        user_id: &str,
        status: PresenceStatus,
    ) -> Result<PresenceState, ChatError> {
        let entry = self.room(room_id).await?;
        let mut state = entry.state.lock().await;

        let presence = state.set_presence(user_id, status)?;
        entry.publish(ChatEvent::PresenceUpdated(presence.clone()));

        info!(
            room_id = %room_id,
            user_id = %user_id,
            status = %status,
            "Presence updated"
        );
        Ok(presence)
    }

    /// Moves the last-read pointer and publishes `chat_read`
    ///
    /// Marking the same or an older message is a no-op and publishes nothing.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        room_id: &str,
        user_id: &str,
        message_id: Option<&str>,
    ) -> Result<ReadMark, ChatError> {
        let entry = self.room(room_id).await?;
        let mut state = entry.state.lock().await;

        let mark = state.mark_read(user_id, message_id)?;
        match &mark {
            ReadMark::Advanced(receipt) => {
                entry.publish(ChatEvent::ChatRead(receipt.clone()));
                debug!(
                    room_id = %room_id,
                    user_id = %user_id,
                    last_read = ?receipt.last_read_message_id,
                    "Chat marked read"
                );
            }
            ReadMark::Unchanged(_) => {
                debug!(
                    room_id = %room_id,
                    user_id = %user_id,
                    "Read pointer unchanged"
                );
            }
        }
        Ok(mark)
    }

    /// Registers a new subscriber on the room's bus
    pub async fn subscribe(&self, room_id: &str) -> Result<Subscription, ChatError> {
        self.room(room_id).await?.bus.subscribe()
    }

    pub async fn subscriber_count(&self, room_id: &str) -> Result<usize, ChatError> {
        Ok(self.room(room_id).await?.bus.subscriber_count())
    }

    pub async fn bot_reply_pending(&self, room_id: &str) -> Result<bool, ChatError> {
        Ok(self.room(room_id).await?.bot.is_pending())
    }

    /// Tears down every room
    ///
    /// Pending bot replies are cancelled and joined before the room's
    /// subscriber channels are closed.
    pub async fn shutdown(&self) {
        let rooms: Vec<(String, Arc<RoomEntry>)> =
            self.inner.rooms.write().await.drain().collect();

        info!(room_count = rooms.len(), "Shutting down dispatcher");

        for (room_id, entry) in rooms {
            entry.bot.cancel().await;
            entry.bus.close_all();
            debug!(room_id = %room_id, "Room torn down");
        }
    }

    fn downgrade(&self) -> WeakDispatcher {
        WeakDispatcher {
            inner: Arc::downgrade(&self.inner),
        }
    }

    async fn room(&self, room_id: &str) -> Result<Arc<RoomEntry>, ChatError> {
        self.inner
            .rooms
            .read()
            .await
            .get(room_id)
            .cloned()
            .ok_or_else(|| {
                debug!(room_id = %room_id, "Chat not found");
                ChatError::RoomNotFound(room_id.to_string())
            })
    }
}

/// Dispatcher handle held by bots, so a room never keeps the hub alive
struct WeakDispatcher {
    inner: Weak<DispatcherInner>,
}

impl WeakDispatcher {
    fn upgrade(&self, room_id: &str) -> Result<Dispatcher, ChatError> {
        match self.inner.upgrade() {
            Some(inner) => Ok(Dispatcher { inner }),
            None => {
                warn!(room_id = %room_id, "Dispatcher dropped before bot action");
                Err(ChatError::RoomNotFound(room_id.to_string()))
            }
        }
    }
}

#[async_trait]
impl BotActions for WeakDispatcher {
    async fn send_message(
        &self,
        room_id: &str,
        user_id: &str,
        kind: MessageKind,
        content: &str,
    ) -> Result<ChatMessage, ChatError> {
        self.upgrade(room_id)?
            .send_message(room_id, user_id, kind, content)
            .await
    }

    async fn set_presence(
        &self,
        room_id: &str,
        user_id: &str,
        status: PresenceStatus,
    ) -> Result<PresenceState, ChatError> {
        self.upgrade(room_id)?
            .set_presence(room_id, user_id, status)
            .await
    }

    async fn mark_read(
        &self,
        room_id: &str,
        user_id: &str,
        message_id: Option<&str>,
    ) -> Result<ReadMark, ChatError> {
        self.upgrade(room_id)?
            .mark_read(room_id, user_id, message_id)
            .await
    }
}
