use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    Notify,
};
use tracing::{debug, warn};

use super::events::ChatEvent;
use crate::room::errors::ChatError;

pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

/// Delivery failures handled inside the hub; never surfaced to callers
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Subscriber buffer overflowed")]
    SubscriberOverflow,

    #[error("Subscriber connection closed")]
    ConnectionClosed,
}

/// Identifies one registration on a room's bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberHandle(u64);

/// Bus side of one registration
#[derive(Debug)]
struct Subscriber {
    sender: mpsc::Sender<Arc<ChatEvent>>,
    closed: Arc<Notify>,
}

impl Subscriber {
    /// Wakes the owner even if it is stuck writing to its peer
    fn force_close(&self) {
        self.closed.notify_one();
    }
}

/// Per-room publish/subscribe channel
///
/// Every subscriber gets its own bounded queue. Publishing never waits:
/// a subscriber whose queue is full is dropped from the bus and told to
/// close through [`Subscription::closed`].
#[derive(Debug)]
pub struct EventBus {
    room_id: String,
    capacity: usize,
    next_handle: AtomicU64,
    closed: AtomicBool,
    subscribers: Mutex<HashMap<SubscriberHandle, Subscriber>>,
}

impl EventBus {
    /// Creates a bus whose subscribers buffer at most `capacity` events
    pub fn new(room_id: impl Into<String>, capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            room_id: room_id.into(),
            capacity: capacity.max(1),
            next_handle: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            subscribers: Mutex::new(HashMap::new()),
        })
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Registers a new delivery channel
    ///
    /// The returned subscription unregisters itself when dropped.
    pub fn subscribe(self: &Arc<Self>) -> Result<Subscription, ChatError> {
        let mut subscribers = self.lock_subscribers();
        // Checked under the lock so close_all cannot race a new registration
        if self.closed.load(Ordering::Acquire) {
            return Err(ChatError::RoomNotFound(self.room_id.clone()));
        }

        let handle = SubscriberHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::channel(self.capacity);
        let closed = Arc::new(Notify::new());
        subscribers.insert(
            handle,
            Subscriber {
                sender,
                closed: Arc::clone(&closed),
            },
        );

        debug!(
            room_id = %self.room_id,
            handle = handle.0,
            subscribers = subscribers.len(),
            "Subscriber registered"
        );

        Ok(Subscription {
            handle,
            receiver,
            closed,
            bus: Arc::clone(self),
        })
    }

    /// Removes a subscriber; unknown handles are ignored
    pub fn unsubscribe(&self, handle: SubscriberHandle) {
        let removed = self.lock_subscribers().remove(&handle).is_some();
        if removed {
            debug!(room_id = %self.room_id, handle = handle.0, "Subscriber removed");
        }
    }

    /// Delivers an event to every registered subscriber, in call order
    ///
    /// Returns how many subscribers accepted the event. Zero subscribers is
    /// not an error.
    pub fn publish(&self, event: ChatEvent) -> usize {
        let event = Arc::new(event);
        let mut subscribers = self.lock_subscribers();
        let mut delivered = 0;

        subscribers.retain(|handle, subscriber| match subscriber.sender.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                subscriber.force_close();
                warn!(
                    room_id = %self.room_id,
                    handle = handle.0,
                    capacity = self.capacity,
                    error = %DeliveryError::SubscriberOverflow,
                    "Dropping slow subscriber"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(
                    room_id = %self.room_id,
                    handle = handle.0,
                    error = %DeliveryError::ConnectionClosed,
                    "Pruning closed subscriber"
                );
                false
            }
        });

        debug!(
            room_id = %self.room_id,
            event_type = event.event_type(),
            receivers = delivered,
            "Room event published"
        );

        delivered
    }

    /// Closes every subscriber channel and refuses new subscriptions
    ///
    /// Each subscriber is force-closed; it still drains what it buffered.
    pub fn close_all(&self) {
        let mut subscribers = self.lock_subscribers();
        self.closed.store(true, Ordering::Release);
        let count = subscribers.len();
        for (_, subscriber) in subscribers.drain() {
            subscriber.force_close();
        }
        debug!(room_id = %self.room_id, closed = count, "Event bus closed");
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    pub fn is_subscribed(&self, handle: SubscriberHandle) -> bool {
        self.lock_subscribers().contains_key(&handle)
    }

    fn lock_subscribers(
        &self,
    ) -> MutexGuard<'_, HashMap<SubscriberHandle, Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// A live registration on a room's bus, owned by exactly one consumer
#[derive(Debug)]
pub struct Subscription {
    handle: SubscriberHandle,
    receiver: mpsc::Receiver<Arc<ChatEvent>>,
    closed: Arc<Notify>,
    bus: Arc<EventBus>,
}

impl Subscription {
    pub fn handle(&self) -> SubscriberHandle {
        self.handle
    }

    pub fn room_id(&self) -> &str {
        self.bus.room_id()
    }

    /// Waits for the next event; `None` once the bus dropped this subscriber
    pub async fn recv(&mut self) -> Option<Arc<ChatEvent>> {
        self.receiver.recv().await
    }

    /// Resolves once the bus has dropped this subscription, either for
    /// overflowing or because the room is being torn down
    ///
    /// Events buffered before that point can still be received.
    pub async fn closed(&self) {
        self.closed.notified().await;
    }

    /// Returns a buffered event without waiting
    pub fn try_recv(&mut self) -> Option<Arc<ChatEvent>> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.handle);
    }
}
