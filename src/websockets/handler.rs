use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    response::Response,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::room::errors::ChatError;
use crate::shared::{AppError, AppState};

use super::{messages::ClientAction, socket::MessageHandler};

/// Message handler routing client actions to the dispatcher
pub struct ClientActionHandler {
    dispatcher: Dispatcher,
}

impl ClientActionHandler {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    async fn apply(
        &self,
        user_id: &str,
        room_id: &str,
        action: ClientAction,
    ) -> Result<(), ChatError> {
        match action {
            ClientAction::SendMessage { kind, content } => {
                self.dispatcher
                    .send_message(room_id, user_id, kind, &content)
                    .await?;
            }
            ClientAction::SetPresence { status } => {
                self.dispatcher
                    .set_presence(room_id, user_id, status)
                    .await?;
            }
            ClientAction::MarkRead { message_id } => {
                self.dispatcher
                    .mark_read(room_id, user_id, message_id.as_deref())
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MessageHandler for ClientActionHandler {
    async fn handle_message(&self, user_id: Option<&str>, room_id: &str, message: String) {
        let Some(user_id) = user_id else {
            debug!(room_id = %room_id, "Ignoring frame from anonymous connection");
            return;
        };

        let action = match serde_json::from_str::<ClientAction>(&message) {
            Ok(action) => action,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    room_id = %room_id,
                    error = %e,
                    "Failed to parse client action"
                );
                return;
            }
        };

        debug!(user_id = %user_id, room_id = %room_id, action = ?action, "Received client action");

        if let Err(e) = self.apply(user_id, room_id, action).await {
            warn!(
                user_id = %user_id,
                room_id = %room_id,
                error = %e,
                "Client action rejected"
            );
        }
    }
}

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct WebSocketQuery {
    /// Participant acting through this socket; read-only when absent
    pub user_id: Option<String>,
}

/// WebSocket upgrade handler
///
/// GET /ws/:chat_id?user_id=X
/// Rejects unknown chats before upgrading.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(chat_id): Path<String>,
    Query(query): Query<WebSocketQuery>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    info!(
        room_id = %chat_id,
        user_id = ?query.user_id,
        "WebSocket connection requested"
    );

    if !state.dispatcher.chat_exists(&chat_id).await {
        warn!(room_id = %chat_id, "Chat not found, rejecting WebSocket connection");
        return Err(ChatError::RoomNotFound(chat_id).into());
    }

    let hub = state.hub.clone();
    Ok(ws.on_upgrade(move |socket| async move {
        // Only reachable if the chat went away between the check and the upgrade
        if let Err(e) = hub.connect(chat_id.clone(), query.user_id, Box::new(socket)).await {
            debug!(room_id = %chat_id, error = %e, "Upgraded connection rejected");
        }
    }))
}
