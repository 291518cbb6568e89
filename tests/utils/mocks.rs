use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use chathub::{SocketError, SocketWrapper};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// In-memory socket handed to the hub
///
/// Frames the hub sends land in the client's `outbound` receiver; frames the
/// client pushes through `inbound` are what the hub receives.
pub struct MockSocket {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
    writable: watch::Receiver<bool>,
    fail_sends: bool,
    closed: Arc<AtomicBool>,
}

/// The client end of a [`MockSocket`]
pub struct MockClient {
    pub inbound: Option<mpsc::UnboundedSender<String>>,
    pub outbound: mpsc::UnboundedReceiver<String>,
    // Held so a stalled socket stays stalled rather than erroring
    _writable: watch::Sender<bool>,
    closed: Arc<AtomicBool>,
}

impl MockSocket {
    pub fn pair() -> (MockSocket, MockClient) {
        Self::build(false, true)
    }

    /// Every send fails as if the peer had vanished
    pub fn broken_pair() -> (MockSocket, MockClient) {
        Self::build(true, true)
    }

    /// Sends never complete, like a peer that stopped reading
    pub fn stalled_pair() -> (MockSocket, MockClient) {
        Self::build(false, false)
    }

    fn build(fail_sends: bool, writable: bool) -> (MockSocket, MockClient) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (writable_tx, writable_rx) = watch::channel(writable);
        let closed = Arc::new(AtomicBool::new(false));

        (
            MockSocket {
                inbound: inbound_rx,
                outbound: outbound_tx,
                writable: writable_rx,
                fail_sends,
                closed: closed.clone(),
            },
            MockClient {
                inbound: Some(inbound_tx),
                outbound: outbound_rx,
                _writable: writable_tx,
                closed,
            },
        )
    }
}

impl MockClient {
    /// Push a text frame to the hub
    pub fn send(&self, frame: &str) {
        if let Some(inbound) = &self.inbound {
            inbound.send(frame.to_string()).unwrap();
        }
    }

    /// Simulate the client hanging up
    pub fn disconnect(&mut self) {
        self.inbound = None;
    }

    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SocketWrapper for MockSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        if self.fail_sends {
            return Err(SocketError::SendFailed("peer reset".to_string()));
        }
        loop {
            let open = *self.writable.borrow();
            if open {
                break;
            }
            if self.writable.changed().await.is_err() {
                return Err(SocketError::ConnectionClosed);
            }
        }
        self.outbound
            .send(message)
            .map_err(|_| SocketError::ConnectionClosed)
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        Ok(self.inbound.recv().await)
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
