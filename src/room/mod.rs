// Public API - what other modules can use
pub use errors::ChatError;
pub use handlers::{
    create_chat, get_messages, get_presence, get_read_receipts, list_chats, mark_read,
    send_message, update_presence,
};
pub use state::RoomState;

// Internal modules
pub mod errors;
mod handlers;
pub mod models;
pub mod state;
pub mod types;
