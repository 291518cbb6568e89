// Library crate for the chat broadcast hub
// This file exposes the public API for integration tests

pub mod bot;
pub mod config;
pub mod dispatcher;
pub mod event;
pub mod room;
pub mod router;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::{BotConfig, HubConfig, ServerConfig};
pub use dispatcher::Dispatcher;
pub use event::{ChatEvent, EventBus, Subscription};
pub use room::{
    models::{ChatMessage, MessageKind, PresenceState, PresenceStatus, ReadReceipt},
    ChatError,
};
pub use shared::{AppError, AppState};
pub use websockets::{ConnectionHub, SocketError, SocketWrapper};
