//! Test assertion helpers for frames delivered to mock clients
#![allow(dead_code)] // Test utilities may not all be used in every test

use std::time::Duration;

use chathub::{ChatEvent, ChatMessage, PresenceState, ReadReceipt};

use super::mocks::MockClient;

// ============================================================================
// Assertion Helpers
// ============================================================================

const FRAME_TIMEOUT: Duration = Duration::from_secs(2);

/// Waits for the next frame a client received and decodes its envelope
pub async fn next_event(client: &mut MockClient) -> ChatEvent {
    let frame = tokio::time::timeout(FRAME_TIMEOUT, client.outbound.recv())
        .await
        .expect("timed out waiting for a frame")
        .expect("socket outbound channel closed");
    serde_json::from_str(&frame).unwrap_or_else(|e| panic!("undecodable frame {frame}: {e}"))
}

/// Like [`next_event`] but tolerates the channel closing
pub async fn try_next_event(client: &mut MockClient, wait: Duration) -> Option<ChatEvent> {
    match tokio::time::timeout(wait, client.outbound.recv()).await {
        Ok(Some(frame)) => Some(serde_json::from_str(&frame).unwrap()),
        _ => None,
    }
}

pub async fn expect_message(client: &mut MockClient) -> ChatMessage {
    match next_event(client).await {
        ChatEvent::MessageReceived(message) => message,
        other => panic!("expected message_received, got {other:?}"),
    }
}

pub async fn expect_presence(client: &mut MockClient) -> PresenceState {
    match next_event(client).await {
        ChatEvent::PresenceUpdated(presence) => presence,
        other => panic!("expected presence_updated, got {other:?}"),
    }
}

pub async fn expect_read(client: &mut MockClient) -> ReadReceipt {
    match next_event(client).await {
        ChatEvent::ChatRead(receipt) => receipt,
        other => panic!("expected chat_read, got {other:?}"),
    }
}

/// Asserts nothing is buffered for the client right now
pub fn assert_no_pending_frames(client: &mut MockClient) {
    if let Ok(frame) = client.outbound.try_recv() {
        panic!("unexpected frame {frame}");
    }
}
