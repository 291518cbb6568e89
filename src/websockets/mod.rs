// Public API
pub use handler::{websocket_handler, ClientActionHandler};
pub use hub::ConnectionHub;
pub use messages::ClientAction;
pub use socket::{Connection, ConnectionEnd, MessageHandler, SocketError, SocketWrapper};

// Internal modules
mod handler;
mod hub;
mod messages;
mod socket;
