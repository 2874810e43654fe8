//! # Event Listeners
//!
//! Callbacks registered on the bus with [`InMemoryEventBus::on`] and run by
//! [`InMemoryEventBus::emit`].
//!
//! [`InMemoryEventBus::on`]: crate::InMemoryEventBus::on
//! [`InMemoryEventBus::emit`]: crate::InMemoryEventBus::emit

use async_trait::async_trait;
use ce_core::Event;
use std::fmt;
use std::future::Future;
use thiserror::Error;

/// A listener's failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("listener failed: {message}")]
pub struct ListenerError {
    pub message: String,
}

impl ListenerError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Receives every event emitted on the bus.
#[async_trait]
pub trait EventListener: Send + Sync {
    async fn on_event(&self, event: &Event) -> Result<(), ListenerError>;
}

/// Adapter turning an async closure into an [`EventListener`].
pub struct FnListener<F> {
    f: F,
}

impl<F> fmt::Debug for FnListener<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> EventListener for FnListener<F>
where
    F: Fn(Event) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ListenerError>> + Send,
{
    async fn on_event(&self, event: &Event) -> Result<(), ListenerError> {
        (self.f)(event.clone()).await
    }
}

/// Wrap `f` as a listener. It receives its own copy of each event.
pub fn listener_fn<F, Fut>(f: F) -> FnListener<F>
where
    F: Fn(Event) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ListenerError>> + Send,
{
    FnListener { f }
}

/// Identifies a registered listener for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);
