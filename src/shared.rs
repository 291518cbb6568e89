use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::dispatcher::Dispatcher;
use crate::room::errors::ChatError;
use crate::websockets::ConnectionHub;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub hub: ConnectionHub,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            hub: ConnectionHub::new(dispatcher.clone()),
            dispatcher,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<ChatError> for AppError {
    fn from(error: ChatError) -> Self {
        let message = error.to_string();
        match error {
            ChatError::RoomNotFound(_) | ChatError::MessageNotFound { .. } => {
                AppError::NotFound(message)
            }
            ChatError::InvalidAuthor { .. } => AppError::Forbidden(message),
            ChatError::InvalidParticipants(_) | ChatError::InvalidContent(_) => {
                AppError::BadRequest(message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
