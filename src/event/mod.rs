// Real-time broadcast components
//
// Per-room fan-out of chat events to live subscribers.

// Public API - what other modules can use
pub use bus::{
    DeliveryError, EventBus, SubscriberHandle, Subscription, DEFAULT_SUBSCRIBER_BUFFER,
};
pub use events::ChatEvent;

// Internal modules
mod bus;
mod events;
