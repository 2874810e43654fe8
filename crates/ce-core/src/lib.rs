//! # CE Core - Event Envelope Codec
//!
//! An immutable, version-aware event envelope (versions 1.0 and 0.3) and its
//! HTTP wire binding.
//!
//! ## Layers
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │ message   Message { headers, body }                │
//! │           binary / structured encode + decode      │
//! │           mode + version detection                 │
//! ├────────────────────────────────────────────────────┤
//! │ parsers   content-type → payload parser registry   │
//! ├────────────────────────────────────────────────────┤
//! │ domain    Event, PropertyBag, schema validation    │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use ce_core::{Event, Mode, HTTP};
//! use serde_json::json;
//!
//! let event = Event::builder()
//!     .source("/orders")
//!     .event_type("order.created")
//!     .data(json!({"id": 7}))
//!     .build()?;
//!
//! let message = HTTP.encode(&event, Mode::Binary);
//! assert_eq!(message.headers["ce-type"], "order.created");
//!
//! let received = (HTTP.to_event)(&message)?;
//! assert_eq!(received.id(), event.id());
//! # Ok::<(), ce_core::EventError>(())
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod constants;
pub mod domain;
pub mod error;
pub mod message;
pub mod parsers;

// Re-export main types
pub use domain::{
    validate, Attribute, Data, Event, EventBuilder, ExtensionKind, Mode, PropertyBag,
    PropertyValue, SpecVersion,
};
pub use error::{EventError, ValidationError};
pub use message::{
    detect_mode, detect_version, is_event, sanitize, to_event, Binding, Body, Headers, Message,
    HTTP,
};
