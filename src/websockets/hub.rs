use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::dispatcher::Dispatcher;
use crate::room::errors::ChatError;

use super::{
    handler::ClientActionHandler,
    socket::{Connection, ConnectionEnd, SocketWrapper},
};

/// Bridges external connections to room event buses
///
/// The hub never mutates room state itself: outbound it forwards events,
/// inbound it hands client frames to the dispatcher.
#[derive(Clone)]
pub struct ConnectionHub {
    dispatcher: Dispatcher,
    message_handler: Arc<ClientActionHandler>,
}

impl ConnectionHub {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            message_handler: Arc::new(ClientActionHandler::new(dispatcher.clone())),
            dispatcher,
        }
    }

    /// Serves one connection until it closes
    ///
    /// Fails with `RoomNotFound` (after closing the socket) when the room
    /// does not exist. Socket errors end the connection and are only logged.
    #[instrument(skip(self, socket))]
    pub async fn connect(
        &self,
        room_id: String,
        user_id: Option<String>,
        mut socket: Box<dyn SocketWrapper>,
    ) -> Result<(), ChatError> {
        let subscription = match self.dispatcher.subscribe(&room_id).await {
            Ok(subscription) => subscription,
            Err(e) => {
                warn!(room_id = %room_id, error = %e, "Closing connection for unknown chat");
                if let Err(close_error) = socket.close().await {
                    debug!(room_id = %room_id, error = %close_error, "Socket already closed");
                }
                return Err(e);
            }
        };

        info!(
            room_id = %room_id,
            user_id = ?user_id,
            handle = ?subscription.handle(),
            "WebSocket connection established"
        );

        let connection = Connection::new(
            user_id.clone(),
            room_id.clone(),
            socket,
            subscription,
            self.message_handler.clone(),
        );

        // The subscription is dropped with the connection on every path below
        match connection.run().await {
            Ok(ConnectionEnd::ClientClosed) => {
                info!(room_id = %room_id, user_id = ?user_id, "WebSocket connection closed cleanly");
            }
            Ok(ConnectionEnd::SubscriptionClosed) => {
                info!(
                    room_id = %room_id,
                    user_id = ?user_id,
                    "Subscription closed by hub, disconnecting client"
                );
            }
            Err(e) => {
                warn!(
                    room_id = %room_id,
                    user_id = ?user_id,
                    error = %e,
                    "WebSocket connection error"
                );
            }
        }
        Ok(())
    }
}
