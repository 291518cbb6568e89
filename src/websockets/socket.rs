use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::event::Subscription;

/// Upper bound on sending the close frame to a peer that stopped reading
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Simple WebSocket abstraction - all we care about is send/receive
#[async_trait]
pub trait SocketWrapper: Send {
    /// Send a text message to the client
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Receive the next text message from the client (None if connection closed)
    async fn receive_message(&mut self) -> Result<Option<String>, SocketError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Handler for incoming WebSocket messages
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle an incoming text frame from the client
    async fn handle_message(&self, user_id: Option<&str>, room_id: &str, message: String);
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),
}

/// Direct implementation on axum's WebSocket
#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // Binary/ping/pong carry no actions
                Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// Why a connection's forwarding loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEnd {
    /// The client went away
    ClientClosed,
    /// The hub dropped the subscription (overflow or room teardown), even
    /// while a write to the client was still pending
    SubscriptionClosed,
}

/// Connection bridges one socket to one room subscription
///
/// Owns the subscription, so every exit path (return, error, task abort)
/// unregisters it from the room's bus.
pub struct Connection {
    pub user_id: Option<String>,
    pub room_id: String,
    socket: Box<dyn SocketWrapper>,
    subscription: Subscription,
    message_handler: Arc<dyn MessageHandler>,
}

impl Connection {
    pub fn new(
        user_id: Option<String>,
        room_id: String,
        socket: Box<dyn SocketWrapper>,
        subscription: Subscription,
        message_handler: Arc<dyn MessageHandler>,
    ) -> Self {
        Self {
            user_id,
            room_id,
            socket,
            subscription,
            message_handler,
        }
    }

    /// Run the connection - forwards events and reads client frames until disconnect
    ///
    /// The socket is closed on every exit path, errors included.
    pub async fn run(mut self) -> Result<ConnectionEnd, SocketError> {
        let outcome = self.forward().await;
        debug!(room_id = %self.room_id, outcome = ?outcome, "Connection loop finished");

        // A stalled peer must not hold the task open on the close frame either
        match timeout(CLOSE_TIMEOUT, self.socket.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(room_id = %self.room_id, error = %e, "Socket already closed"),
            Err(_) => debug!(room_id = %self.room_id, "Timed out closing socket"),
        }
        outcome
    }

    async fn forward(&mut self) -> Result<ConnectionEnd, SocketError> {
        loop {
            tokio::select! {
                // Outbound: room events to the client
                event = self.subscription.recv() => {
                    let Some(event) = event else {
                        return Ok(ConnectionEnd::SubscriptionClosed);
                    };
                    let payload = match event.to_wire() {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!(
                                room_id = %self.room_id,
                                event_type = event.event_type(),
                                error = %e,
                                "Failed to serialize event"
                            );
                            continue;
                        }
                    };

                    // A write that cannot finish loses to the bus dropping us
                    tokio::select! {
                        biased;
                        sent = self.socket.send_message(payload) => sent?,
                        _ = self.subscription.closed() => {
                            warn!(
                                room_id = %self.room_id,
                                user_id = ?self.user_id,
                                "Subscriber dropped while blocked on write, closing"
                            );
                            return Ok(ConnectionEnd::SubscriptionClosed);
                        }
                    }
                }

                // Inbound: client frames to the handler
                msg = self.socket.receive_message() => {
                    match msg? {
                        Some(message) => {
                            self.message_handler
                                .handle_message(self.user_id.as_deref(), &self.room_id, message)
                                .await;
                        }
                        None => return Ok(ConnectionEnd::ClientClosed),
                    }
                }
            }
        }
    }
}
