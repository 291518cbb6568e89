use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::{
    models::{ChatMessage, ChatSummary, PresenceState, ReadReceipt},
    types::{
        CreateChatRequest, MarkReadRequest, PresenceUpdateRequest, PresenceUpdateResponse,
        ReadReceiptsResponse, SendMessageRequest, SendMessageResponse,
    },
};
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a new chat
///
/// POST /chats
#[instrument(name = "create_chat", skip(state))]
pub async fn create_chat(
    State(state): State<AppState>,
    Json(request): Json<CreateChatRequest>,
) -> Result<Json<ChatSummary>, AppError> {
    let chat = state.dispatcher.create_chat(request.participants).await?;
    Ok(Json(chat))
}

/// HTTP handler for listing all chats
///
/// GET /chats
#[instrument(name = "list_chats", skip(state))]
pub async fn list_chats(State(state): State<AppState>) -> Json<Vec<ChatSummary>> {
    let chats = state.dispatcher.list_chats().await;
    info!(chat_count = chats.len(), "Chats listed successfully");
    Json(chats)
}

/// GET /chats/:chat_id/messages
#[instrument(name = "get_messages", skip(state))]
pub async fn get_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    Ok(Json(state.dispatcher.get_messages(&chat_id).await?))
}

/// POST /chats/:chat_id/messages
#[instrument(name = "send_message", skip(state, request))]
pub async fn send_message(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let message = state
        .dispatcher
        .send_message(&chat_id, &request.user_id, request.kind, &request.content)
        .await?;

    Ok(Json(SendMessageResponse {
        status: "message_sent".to_string(),
        message,
    }))
}

/// POST /chats/:chat_id/presence
#[instrument(name = "update_presence", skip(state))]
pub async fn update_presence(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Json(request): Json<PresenceUpdateRequest>,
) -> Result<Json<PresenceUpdateResponse>, AppError> {
    let presence = state
        .dispatcher
        .set_presence(&chat_id, &request.user_id, request.status)
        .await?;

    Ok(Json(PresenceUpdateResponse {
        chat_id,
        user_id: presence.user_id,
        status: presence.status,
        last_seen: presence.last_seen,
    }))
}

/// GET /chats/:chat_id/presence
#[instrument(name = "get_presence", skip(state))]
pub async fn get_presence(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<Vec<PresenceState>>, AppError> {
    Ok(Json(state.dispatcher.get_presence(&chat_id).await?))
}

/// POST /chats/:chat_id/read
///
/// Responds with the stored pointer, which is unchanged when an older
/// message was marked.
#[instrument(name = "mark_read", skip(state))]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Json(request): Json<MarkReadRequest>,
) -> Result<Json<ReadReceipt>, AppError> {
    let mark = state
        .dispatcher
        .mark_read(&chat_id, &request.user_id, request.message_id.as_deref())
        .await?;
    Ok(Json(mark.into_receipt()))
}

/// GET /chats/:chat_id/read
#[instrument(name = "get_read_receipts", skip(state))]
pub async fn get_read_receipts(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<ReadReceiptsResponse>, AppError> {
    let read_receipts = state.dispatcher.get_read_receipts(&chat_id).await?;
    Ok(Json(ReadReceiptsResponse {
        chat_id,
        read_receipts,
    }))
}
