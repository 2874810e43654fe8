//! Message Layer - the HTTP wire binding
//!
//! This layer contains:
//! - The transport-neutral `Message` (headers + body)
//! - Binary and structured encoders/decoders
//! - Mode and version detection
//! - The static attribute ↔ wire mapping tables
//!
//! RULES:
//! - Decoding never validates; callers validate the returned event
//! - Encoding never fails

pub mod binary;
pub mod detect;
pub mod mapping;
pub mod structured;

use crate::constants::{mime, HEADER_CONTENT_TYPE};
use crate::domain::{Event, Mode, PropertyValue};
use crate::error::{EventError, ValidationError};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

pub use detect::{detect_mode, detect_version};

/// Header name → header value.
pub type Headers = BTreeMap<String, String>;

/// A message body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    /// An already-structured value.
    Json(Value),
    Bytes(Vec<u8>),
}

impl Body {
    /// Empty text, empty bytes and JSON null count as no body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Text(text) => text.is_empty(),
            Body::Bytes(bytes) => bytes.is_empty(),
            Body::Json(value) => value.is_null(),
        }
    }

    /// Whether the body is string- or object-shaped.
    #[must_use]
    pub fn is_string_or_object(&self) -> bool {
        match self {
            Body::Text(_) | Body::Bytes(_) => true,
            Body::Json(value) => value.is_string() || value.is_object() || value.is_array(),
        }
    }

    /// Body content as text, if it has a textual form.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            Body::Json(Value::String(text)) => Some(text),
            Body::Bytes(bytes) => std::str::from_utf8(bytes).ok(),
            Body::Json(_) => None,
        }
    }
}

impl From<Body> for PropertyValue {
    fn from(body: Body) -> Self {
        match body {
            Body::Text(text) => PropertyValue::Json(Value::String(text)),
            Body::Json(value) => PropertyValue::Json(value),
            Body::Bytes(bytes) => PropertyValue::Binary(bytes),
        }
    }
}

/// A transport-neutral HTTP-like message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    pub headers: Headers,
    pub body: Option<Body>,
}

impl Message {
    #[must_use]
    pub fn new(headers: Headers, body: Option<Body>) -> Self {
        Self { headers, body }
    }

    /// Header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The body, unless absent or empty.
    #[must_use]
    pub fn payload(&self) -> Option<&Body> {
        self.body.as_ref().filter(|body| !body.is_empty())
    }
}

/// Lower-case every header name and default `content-type` to JSON.
#[must_use]
pub fn sanitize(headers: &Headers) -> Headers {
    let mut sanitized: Headers = headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
        .collect();
    sanitized
        .entry(HEADER_CONTENT_TYPE.to_string())
        .or_insert_with(|| mime::JSON.to_string());
    sanitized
}

/// Decode a message in whichever mode and version it carries.
///
/// The result is not validated.
///
/// # Errors
///
/// - [`ValidationError::NoEventDetected`] when the message is not an event.
/// - Any error of the mode-specific decoder.
pub fn to_event(message: &Message) -> Result<Event, EventError> {
    let headers = sanitize(&message.headers);
    let mode = detect_mode(&headers)?;
    let version = detect_version(mode, &headers, message.payload())?;
    debug!(%mode, %version, "decoding event message");
    match mode {
        Mode::Binary => binary::decode(message, version),
        Mode::Structured => structured::decode(message, version),
    }
}

/// Whether [`to_event`] would succeed.
#[must_use]
pub fn is_event(message: &Message) -> bool {
    to_event(message).is_ok()
}

/// A protocol binding: how events map onto one transport's messages.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub binary: fn(&Event) -> Message,
    pub structured: fn(&Event) -> Message,
    pub to_event: fn(&Message) -> Result<Event, EventError>,
    pub is_event: fn(&Message) -> bool,
}

impl Binding {
    /// Encode `event` in `mode`.
    #[must_use]
    pub fn encode(&self, event: &Event, mode: Mode) -> Message {
        match mode {
            Mode::Binary => (self.binary)(event),
            Mode::Structured => (self.structured)(event),
        }
    }
}

/// The HTTP binding.
pub const HTTP: Binding = Binding {
    binary: binary::encode,
    structured: structured::encode,
    to_event,
    is_event,
};

pub(crate) fn check_version_header(headers: &Headers) -> Result<(), ValidationError> {
    match headers.get(crate::constants::headers::SPEC_VERSION) {
        Some(version) if crate::domain::SpecVersion::parse(version).is_none() => {
            Err(ValidationError::InvalidSpecVersion(version.clone()))
        }
        _ => Ok(()),
    }
}
