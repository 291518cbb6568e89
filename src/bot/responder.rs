use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::{
    config::BotConfig,
    event::ChatEvent,
    room::{errors::ChatError, models::PresenceStatus},
};

use super::types::{BotActions, BotReply, BOT_REPLIES};

/// Simulated participant bound to one room
///
/// A human `message_received` schedules one bot reply after a randomized
/// delay. While a reply is pending, further triggers are ignored: the timer
/// is neither reset nor duplicated.
pub struct BotResponder {
    room_id: String,
    config: BotConfig,
    actions: Arc<dyn BotActions>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl BotResponder {
    pub fn new(room_id: String, config: BotConfig, actions: Arc<dyn BotActions>) -> Self {
        Self {
            room_id,
            config,
            actions,
            pending: Mutex::new(None),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.config.user_id
    }

    /// Reacts to an event published in the room
    ///
    /// Returns true when a new reply was scheduled.
    pub fn observe(&self, event: &ChatEvent) -> bool {
        let author = match event {
            ChatEvent::MessageReceived(message) => &message.user_id,
            _ => return false,
        };
        if author == &self.config.user_id {
            return false;
        }

        let mut pending = self.lock_pending();
        if pending.as_ref().is_some_and(|task| !task.is_finished()) {
            debug!(
                room_id = %self.room_id,
                author = %author,
                "Bot reply already pending, ignoring trigger"
            );
            return false;
        }

        let (delay, reply) = self.roll();
        info!(
            room_id = %self.room_id,
            delay_ms = delay.as_millis() as u64,
            "Scheduling bot reply"
        );

        let task = ReplyTask {
            room_id: self.room_id.clone(),
            bot_id: self.config.user_id.clone(),
            announce_activity: self.config.announce_activity,
            actions: Arc::clone(&self.actions),
        };
        *pending = Some(tokio::spawn(task.run(delay, reply)));
        true
    }

    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Aborts the pending reply, if any, and waits for it to stop
    pub async fn cancel(&self) {
        let task = self.lock_pending().take();
        if let Some(task) = task {
            task.abort();
            if task.await.is_err() {
                debug!(room_id = %self.room_id, "Pending bot reply cancelled");
            }
        }
    }

    /// Draws the delay and reply; done before spawning since the rng is not Send
    fn roll(&self) -> (Duration, BotReply) {
        let mut rng = rand::rng();
        let min = self.config.min_delay.as_millis() as u64;
        let max = (self.config.max_delay.as_millis() as u64).max(min);
        let delay = Duration::from_millis(rng.random_range(min..=max));
        let reply = BOT_REPLIES[rng.random_range(0..BOT_REPLIES.len())];
        (delay, reply)
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for BotResponder {
    fn drop(&mut self) {
        if let Some(task) = self.lock_pending().take() {
            task.abort();
        }
    }
}

/// One scheduled reply, run on its own task
struct ReplyTask {
    room_id: String,
    bot_id: String,
    announce_activity: bool,
    actions: Arc<dyn BotActions>,
}

impl ReplyTask {
    async fn run(self, delay: Duration, reply: BotReply) {
        sleep(delay).await;

        if let Err(e) = self.reply(reply).await {
            warn!(
                room_id = %self.room_id,
                error = %e,
                "Bot reply failed, dropping it"
            );
        }
    }

    async fn reply(&self, reply: BotReply) -> Result<(), ChatError> {
        let (room, bot) = (self.room_id.as_str(), self.bot_id.as_str());

        if self.announce_activity {
            self.actions
                .set_presence(room, bot, PresenceStatus::Online)
                .await?;
            self.actions.mark_read(room, bot, None).await?;
            self.actions
                .set_presence(room, bot, PresenceStatus::Typing)
                .await?;
        }

        let message = self
            .actions
            .send_message(room, bot, reply.kind, reply.content)
            .await?;
        info!(
            room_id = %room,
            message_id = %message.id,
            kind = %message.kind,
            "Bot replied"
        );

        if self.announce_activity {
            self.actions
                .set_presence(room, bot, PresenceStatus::Offline)
                .await?;
        }
        Ok(())
    }
}
