//! # Event Publisher
//!
//! Defines the publishing side of the event bus: filtered broadcast
//! subscriptions plus a registry of listeners run on every emit.

use crate::config::BusConfig;
use crate::emitter::EmitError;
use crate::events::EventFilter;
use crate::listener::{EventListener, ListenerId};
use crate::subscriber::{EventStream, Subscription, SubscriptionCounts};
use async_trait::async_trait;
use ce_core::Event;
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to subscribers.
    ///
    /// Returns the number of active subscribers that received it.
    async fn publish(&self, event: Event) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the event bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
/// subscriptions. One bus is created by the application and handed to
/// whoever needs it.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<Event>,
    listeners: RwLock<BTreeMap<ListenerId, Arc<dyn EventListener>>>,
    next_listener: AtomicU64,
    /// Active subscription count by filter.
    subscriptions: SubscriptionCounts,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Create a new in-memory event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(BusConfig::builder().capacity(capacity).build())
    }

    #[must_use]
    pub fn with_config(config: BusConfig) -> Self {
        let capacity = config.capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            listeners: RwLock::new(BTreeMap::new()),
            next_listener: AtomicU64::new(0),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Register a listener run on every [`emit`](Self::emit).
    pub fn on(&self, listener: impl EventListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.insert(id, Arc::new(listener));
        }
        debug!(listener = id.0, "Listener registered");
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn off(&self, id: ListenerId) -> bool {
        self.listeners
            .write()
            .map(|mut listeners| listeners.remove(&id).is_some())
            .unwrap_or(false)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().map(|l| l.len()).unwrap_or(0)
    }

    /// Notify listeners and subscribers of `event`.
    ///
    /// With `ensure_delivery`, every listener runs to completion before this
    /// returns and the first failure is reported. Otherwise listeners are
    /// spawned onto the runtime and failures are only logged.
    ///
    /// Returns the number of subscribers that received the event.
    ///
    /// # Errors
    ///
    /// [`EmitError::Listener`] when a listener fails under `ensure_delivery`.
    pub async fn emit(&self, event: Event, ensure_delivery: bool) -> Result<usize, EmitError> {
        let listeners: Vec<Arc<dyn EventListener>> = self
            .listeners
            .read()
            .map(|l| l.values().cloned().collect())
            .unwrap_or_default();

        if ensure_delivery {
            let results = join_all(listeners.iter().map(|l| l.on_event(&event))).await;
            if let Some(err) = results.into_iter().find_map(Result::err) {
                warn!(id = event.id(), error = %err, "Listener failed");
                return Err(EmitError::Listener(err));
            }
        } else {
            for listener in listeners {
                let event = event.clone();
                tokio::spawn(async move {
                    if let Err(err) = listener.on_event(&event).await {
                        warn!(id = event.id(), error = %err, "Listener failed (not awaited)");
                    }
                });
            }
        }

        Ok(self.publish(event).await)
    }

    /// Subscribe to events matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let key = filter_key(&filter);
        if let Ok(mut subs) = self.subscriptions.write() {
            *subs.entry(key.clone()).or_insert(0) += 1;
        }
        debug!(types = ?filter.types, sources = ?filter.sources, "New subscription created");
        Subscription::new(receiver, filter, self.subscriptions.clone(), key)
    }

    /// Convenience wrapper around [`subscribe`](Self::subscribe).
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Active subscriptions created with an identical filter.
    #[must_use]
    pub fn subscriptions_for(&self, filter: &EventFilter) -> usize {
        self.subscriptions
            .read()
            .ok()
            .and_then(|subs| subs.get(&filter_key(filter)).copied())
            .unwrap_or(0)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn filter_key(filter: &EventFilter) -> String {
    format!("{:?}/{:?}", filter.types, filter.sources)
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: Event) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        let id = event.id().to_string();

        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(id = %id, receivers = receiver_count, "Event published");
                receiver_count
            }
            Err(_) => {
                debug!(id = %id, "Event dropped (no receivers)");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
