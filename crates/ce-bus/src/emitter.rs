//! # Emitter
//!
//! Encodes events with a protocol binding and hands the resulting message to
//! a pluggable [`Transport`]. The transport does the actual I/O.

use crate::listener::ListenerError;
use async_trait::async_trait;
use ce_core::{Binding, Event, Message, Mode, HTTP};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Free-form per-send options passed through to the transport untouched.
pub type TransportOptions = Map<String, Value>;

/// A transport failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The receiving side refused the message.
    #[error("message rejected with status {status}: {reason}")]
    Rejected { status: u16, reason: String },

    /// The message could not be delivered.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Errors from emitting an event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmitError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Delivers encoded messages somewhere.
#[async_trait]
pub trait Transport: Send + Sync {
    /// What a successful delivery yields.
    type Response: Send;

    async fn deliver(
        &self,
        message: Message,
        options: &TransportOptions,
    ) -> Result<Self::Response, TransportError>;
}

/// How an [`Emitter`] encodes events.
#[derive(Debug, Clone, Copy)]
pub struct EmitterOptions {
    pub binding: Binding,
    pub mode: Mode,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            binding: HTTP,
            mode: Mode::Binary,
        }
    }
}

/// Encodes events and sends them through a transport.
#[derive(Debug)]
pub struct Emitter<T> {
    transport: T,
    options: EmitterOptions,
}

impl<T: Transport> Emitter<T> {
    /// Encode `event` and deliver it.
    ///
    /// # Errors
    ///
    /// [`EmitError::Transport`] when delivery fails.
    pub async fn send(
        &self,
        event: &Event,
        options: &TransportOptions,
    ) -> Result<T::Response, EmitError> {
        let message = self.options.binding.encode(event, self.options.mode);
        debug!(id = event.id(), mode = %self.options.mode, "Sending event");
        Ok(self.transport.deliver(message, options).await?)
    }

    #[must_use]
    pub fn options(&self) -> &EmitterOptions {
        &self.options
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

/// Build an emitter around `transport`.
#[must_use]
pub fn emitter_for<T: Transport>(transport: T, options: EmitterOptions) -> Emitter<T> {
    Emitter { transport, options }
}
