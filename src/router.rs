use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::room;
use crate::shared::AppState;
use crate::websockets::websocket_handler;

/// Builds the HTTP + WebSocket surface of the hub
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/chats", post(room::create_chat).get(room::list_chats))
        .route(
            "/chats/:chat_id/messages",
            get(room::get_messages).post(room::send_message),
        )
        .route(
            "/chats/:chat_id/presence",
            get(room::get_presence).post(room::update_presence),
        )
        .route(
            "/chats/:chat_id/read",
            get(room::get_read_receipts).post(room::mark_read),
        )
        .route("/ws/:chat_id", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
