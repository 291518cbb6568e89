use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;

use chathub::{BotConfig, ChatError, ConnectionHub, Dispatcher, HubConfig};

use super::mocks::{MockClient, MockSocket};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub dispatcher: Dispatcher,
    pub hub: ConnectionHub,
    pub chat_id: String,
    pub participants: Vec<String>,
    pub clients: HashMap<String, MockClient>,
    pub connections: HashMap<String, JoinHandle<Result<(), ChatError>>>,
}

pub struct TestSetupBuilder {
    participants: Vec<String>,
    bot_delay: Duration,
    announce_activity: bool,
    subscriber_buffer: usize,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            participants: vec![],
            // Long enough that the bot stays quiet unless a test opts in
            bot_delay: Duration::from_secs(60),
            announce_activity: false,
            subscriber_buffer: 64,
        }
    }

    pub fn with_participants(mut self, participants: Vec<&str>) -> Self {
        self.participants = participants.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_participants(self) -> Self {
        self.with_participants(vec!["alice", "bob"])
    }

    pub fn with_bot_delay(mut self, delay: Duration) -> Self {
        self.bot_delay = delay;
        self
    }

    pub fn with_announced_bot(mut self) -> Self {
        self.announce_activity = true;
        self
    }

    pub fn with_subscriber_buffer(mut self, capacity: usize) -> Self {
        self.subscriber_buffer = capacity;
        self
    }

    pub async fn build(self) -> TestSetup {
        let config = HubConfig {
            subscriber_buffer: self.subscriber_buffer,
            bot: BotConfig::default()
                .with_delay(self.bot_delay, self.bot_delay)
                .with_announce_activity(self.announce_activity),
        };
        let dispatcher = Dispatcher::new(config);
        let hub = ConnectionHub::new(dispatcher.clone());

        let chat = dispatcher
            .create_chat(self.participants.clone())
            .await
            .unwrap();

        TestSetup {
            dispatcher,
            hub,
            chat_id: chat.chat_id,
            participants: self.participants,
            clients: HashMap::new(),
            connections: HashMap::new(),
        }
    }
}

impl TestSetup {
    /// Connects every participant with a healthy socket
    pub async fn connect_all(&mut self) {
        for user in self.participants.clone() {
            self.connect(&user).await;
        }
    }

    pub async fn connect(&mut self, user_id: &str) {
        let (socket, client) = MockSocket::pair();
        self.attach(user_id, socket, client).await;
    }

    pub async fn connect_stalled(&mut self, user_id: &str) {
        let (socket, client) = MockSocket::stalled_pair();
        self.attach(user_id, socket, client).await;
    }

    pub async fn connect_broken(&mut self, user_id: &str) {
        let (socket, client) = MockSocket::broken_pair();
        self.attach(user_id, socket, client).await;
    }

    /// Spawns the hub side of a connection and waits until it is subscribed
    async fn attach(&mut self, user_id: &str, socket: MockSocket, client: MockClient) {
        let before = self.subscriber_count().await;

        let hub = self.hub.clone();
        let chat_id = self.chat_id.clone();
        let user = user_id.to_string();
        let handle =
            tokio::spawn(async move { hub.connect(chat_id, Some(user), Box::new(socket)).await });

        self.wait_for_subscribers(before + 1).await;
        self.clients.insert(user_id.to_string(), client);
        self.connections.insert(user_id.to_string(), handle);
    }

    pub fn client(&mut self, user_id: &str) -> &mut MockClient {
        self.clients
            .get_mut(user_id)
            .unwrap_or_else(|| panic!("{user_id} is not connected"))
    }

    pub async fn subscriber_count(&self) -> usize {
        self.dispatcher
            .subscriber_count(&self.chat_id)
            .await
            .unwrap()
    }

    /// Polls until the room has exactly `expected` subscribers
    pub async fn wait_for_subscribers(&self, expected: usize) {
        let waited = tokio::time::timeout(Duration::from_secs(2), async {
            while self.subscriber_count().await != expected {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(
            waited.is_ok(),
            "expected {expected} subscribers, found {}",
            self.subscriber_count().await
        );
    }

    /// Waits for a spawned connection to finish
    pub async fn join(&mut self, user_id: &str) -> Result<(), ChatError> {
        let handle = self
            .connections
            .remove(user_id)
            .unwrap_or_else(|| panic!("{user_id} has no running connection"));
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("connection did not finish")
            .expect("connection task panicked")
    }
}
