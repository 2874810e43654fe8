//! # Integration Test Flows
//!
//! Sender and receiver wired together in-process:
//!
//! 1. **Emitter → Transport**: an envelope is encoded with the HTTP binding
//! 2. **Transport → Receiver**: the message is decoded and validated
//! 3. **Receiver → Bus**: the decoded envelope is emitted to listeners and
//!    subscribers

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use ce_bus::{
        emitter_for, listener_fn, EmitError, EmitterOptions, EventFilter, EventPublisher,
        InMemoryEventBus, ListenerError, Transport, TransportError, TransportOptions,
    };
    use ce_core::{Event, Message, Mode, HTTP};
    use crate::integration::init_test_logging;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Decodes delivered messages and emits them on a receiving bus.
    struct LoopbackTransport {
        bus: Arc<InMemoryEventBus>,
        ensure_delivery: bool,
    }

    #[async_trait]
    impl Transport for LoopbackTransport {
        type Response = usize;

        async fn deliver(
            &self,
            message: Message,
            _options: &TransportOptions,
        ) -> Result<usize, TransportError> {
            let event = (HTTP.to_event)(&message).map_err(|e| TransportError::Rejected {
                status: 400,
                reason: e.to_string(),
            })?;
            event.validate().map_err(|e| TransportError::Rejected {
                status: 422,
                reason: e.to_string(),
            })?;
            self.bus
                .emit(event, self.ensure_delivery)
                .await
                .map_err(|e| TransportError::Delivery(e.to_string()))
        }
    }

    fn order_event() -> Event {
        Event::builder()
            .source("/orders")
            .event_type("order.created")
            .subject("orders/42")
            .datacontenttype("application/json")
            .data(json!({"total": 42}))
            .extension("tenant", "acme")
            .build()
            .unwrap()
    }

    fn loopback(bus: &Arc<InMemoryEventBus>, ensure_delivery: bool) -> LoopbackTransport {
        LoopbackTransport {
            bus: bus.clone(),
            ensure_delivery,
        }
    }

    // =============================================================================
    // INTEGRATION TESTS: EMITTER → BUS
    // =============================================================================

    #[tokio::test]
    async fn test_emitted_event_reaches_subscriber_in_both_modes() {
        init_test_logging();
        for mode in [Mode::Binary, Mode::Structured] {
            let bus = Arc::new(InMemoryEventBus::new());
            let mut sub = bus.subscribe(EventFilter::types(["order.created"]));
            let options = EmitterOptions { binding: HTTP, mode };
            let emitter = emitter_for(loopback(&bus, true), options);

            let sent = order_event();
            let receivers = emitter.send(&sent, &TransportOptions::new()).await.unwrap();
            assert_eq!(receivers, 1);

            let received = timeout(Duration::from_millis(100), sub.recv())
                .await
                .expect("timeout")
                .expect("event");
            assert_eq!(received, sent, "mode {mode}");
        }
    }

    #[tokio::test]
    async fn test_listener_failure_surfaces_through_emitter() {
        let bus = Arc::new(InMemoryEventBus::new());
        bus.on(listener_fn(|event: Event| async move {
            match event.extension("tenant").and_then(|t| t.as_str()) {
                Some("acme") => Err(ListenerError::new("tenant suspended")),
                _ => Ok(()),
            }
        }));
        let emitter = emitter_for(loopback(&bus, true), EmitterOptions::default());

        let result = emitter.send(&order_event(), &TransportOptions::new()).await;
        assert!(matches!(
            result,
            Err(EmitError::Transport(TransportError::Delivery(reason))) if reason.contains("tenant suspended")
        ));
    }

    #[tokio::test]
    async fn test_fire_and_forget_listeners_still_run() {
        init_test_logging();
        let bus = Arc::new(InMemoryEventBus::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let (done_tx, mut done_rx) = tokio::sync::mpsc::unbounded_channel();
        {
            let calls = calls.clone();
            bus.on(listener_fn(move |_event: Event| {
                let calls = calls.clone();
                let done_tx = done_tx.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    let _ = done_tx.send(());
                    Err(ListenerError::new("logged, not returned"))
                }
            }));
        }
        let emitter = emitter_for(loopback(&bus, false), EmitterOptions::default());

        assert!(emitter
            .send(&order_event(), &TransportOptions::new())
            .await
            .is_ok());
        timeout(Duration::from_millis(200), done_rx.recv())
            .await
            .expect("timeout")
            .expect("listener ran");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_envelope_rejected_before_bus() {
        let bus = Arc::new(InMemoryEventBus::new());
        let mut sub = bus.subscribe(EventFilter::all());
        let emitter = emitter_for(loopback(&bus, true), EmitterOptions::default());

        // Lenient construction lets an envelope without a source reach the wire.
        let invalid = Event::builder().event_type("t").build_lenient().unwrap();
        let result = emitter.send(&invalid, &TransportOptions::new()).await;

        assert!(matches!(
            result,
            Err(EmitError::Transport(TransportError::Rejected { status: 422, .. }))
        ));
        assert!(sub.try_recv().unwrap().is_none());
        assert_eq!(bus.events_published(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_emitters_share_one_bus() {
        let bus = Arc::new(InMemoryEventBus::new());
        let seen = Arc::new(AtomicUsize::new(0));
        {
            let seen = seen.clone();
            bus.on(listener_fn(move |_event: Event| {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }));
        }

        let sends = (0..8).map(|i| {
            let bus = bus.clone();
            async move {
                let mode = if i % 2 == 0 { Mode::Binary } else { Mode::Structured };
                let options = EmitterOptions { binding: HTTP, mode };
                let emitter = emitter_for(loopback(&bus, true), options);
                emitter.send(&order_event(), &TransportOptions::new()).await
            }
        });
        let results = futures::future::join_all(sends).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(seen.load(Ordering::SeqCst), 8);
    }
}
