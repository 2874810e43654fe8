//! # CE Bus - Local Event Delivery
//!
//! Moves envelopes inside a process and out of it:
//!
//! - [`InMemoryEventBus`] notifies registered listeners (awaited or
//!   fire-and-forget) and filtered subscribers.
//! - [`Emitter`] encodes envelopes with a protocol binding and hands them to
//!   a pluggable [`Transport`].
//!
//! ```text
//!  Event ──emit()──► InMemoryEventBus ──► listeners (on)
//!                                     └─► subscriptions (subscribe)
//!
//!  Event ──send()──► Emitter ──encode──► Transport::deliver(Message)
//! ```
//!
//! The bus is an explicit handle owned by the application; there is no
//! process-wide instance.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod emitter;
pub mod events;
pub mod listener;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use config::{BusConfig, BusConfigBuilder};
pub use emitter::{
    emitter_for, EmitError, Emitter, EmitterOptions, Transport, TransportError, TransportOptions,
};
pub use events::EventFilter;
pub use listener::{listener_fn, EventListener, FnListener, ListenerError, ListenerId};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
        assert_eq!(BusConfig::default().capacity, DEFAULT_CHANNEL_CAPACITY);
    }
}
