//! # Parser Registry
//!
//! Content-type-keyed payload transforms applied to message bodies on
//! decode. The registries are built once on first use and are read-only
//! afterwards, so they can be shared freely across threads.
//!
//! | Content type | Parser |
//! |--------------|--------|
//! | `application/json` | JSON |
//! | `application/cloudevents+json` | JSON |
//! | `application/octet-stream` | pass-through |
//!
//! With `base64` content encoding, JSON types use base64-then-JSON.

use crate::constants::{mime, ENCODING_BASE64};
use crate::domain::time;
use crate::error::ValidationError;
use crate::message::Body;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// A payload transform.
pub trait PayloadParser: Send + Sync + fmt::Debug {
    /// Transform `body`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the payload cannot be transformed.
    fn parse(&self, body: Body) -> Result<Body, ValidationError>;
}

/// JSON text (or bytes) → structured value. Structured input passes through.
#[derive(Debug, Default)]
pub struct JsonParser {
    decorator: Option<Box<dyn PayloadParser>>,
}

impl JsonParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `decorator` before JSON parsing.
    #[must_use]
    pub fn decorated(decorator: impl PayloadParser + 'static) -> Self {
        Self {
            decorator: Some(Box::new(decorator)),
        }
    }
}

impl PayloadParser for JsonParser {
    fn parse(&self, body: Body) -> Result<Body, ValidationError> {
        let body = match &self.decorator {
            Some(decorator) => decorator.parse(body)?,
            None => body,
        };
        match body {
            Body::Text(text) => Ok(Body::Json(serde_json::from_str(&text)?)),
            Body::Bytes(bytes) => Ok(Body::Json(serde_json::from_slice(&bytes)?)),
            Body::Json(Value::String(text)) => Ok(Body::Json(serde_json::from_str(&text)?)),
            Body::Json(value @ (Value::Object(_) | Value::Array(_))) => Ok(Body::Json(value)),
            Body::Json(other) => Err(ValidationError::InvalidBody(format!(
                "invalid payload type, allowed are: string or object, got {other}"
            ))),
        }
    }
}

/// Leaves the payload untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThroughParser;

impl PayloadParser for PassThroughParser {
    fn parse(&self, body: Body) -> Result<Body, ValidationError> {
        Ok(body)
    }
}

/// base64 text → decoded UTF-8 text.
#[derive(Debug, Default, Clone, Copy)]
pub struct Base64Parser;

impl PayloadParser for Base64Parser {
    fn parse(&self, body: Body) -> Result<Body, ValidationError> {
        let encoded = match &body {
            Body::Text(text) => text.trim().as_bytes().to_vec(),
            Body::Json(Value::String(text)) => text.trim().as_bytes().to_vec(),
            Body::Bytes(bytes) => bytes.clone(),
            Body::Json(other) => {
                return Err(ValidationError::InvalidEncodedData(other.to_string()));
            }
        };
        let decoded = STANDARD.decode(&encoded).map_err(|e| {
            ValidationError::InvalidEncodedData(format!("{}: {e}", String::from_utf8_lossy(&encoded)))
        })?;
        Ok(Body::Text(String::from_utf8_lossy(&decoded).into_owned()))
    }
}

type Registry = HashMap<&'static str, Box<dyn PayloadParser>>;

static PARSERS_BY_CONTENT_TYPE: LazyLock<Registry> = LazyLock::new(|| {
    let mut parsers: Registry = HashMap::new();
    parsers.insert(mime::JSON, Box::new(JsonParser::new()));
    parsers.insert(mime::CE_JSON, Box::new(JsonParser::new()));
    parsers.insert(mime::OCTET_STREAM, Box::new(PassThroughParser));
    parsers
});

static BASE64_PARSERS_BY_CONTENT_TYPE: LazyLock<Registry> = LazyLock::new(|| {
    let mut parsers: Registry = HashMap::new();
    parsers.insert(mime::JSON, Box::new(JsonParser::decorated(Base64Parser)));
    parsers.insert(mime::CE_JSON, Box::new(JsonParser::decorated(Base64Parser)));
    parsers.insert(mime::OCTET_STREAM, Box::new(PassThroughParser));
    parsers
});

/// Lower-cased media type with parameters (`; charset=...`) removed.
#[must_use]
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// The parser registered for a content type.
#[must_use]
pub fn parser_for(content_type: &str) -> Option<&'static dyn PayloadParser> {
    PARSERS_BY_CONTENT_TYPE
        .get(essence(content_type).as_str())
        .map(Box::as_ref)
}

/// The parser for a content type under a content encoding.
///
/// Only `base64` is a recognized encoding.
#[must_use]
pub fn parser_for_encoding(
    encoding: &str,
    content_type: &str,
) -> Option<&'static dyn PayloadParser> {
    if !encoding.eq_ignore_ascii_case(ENCODING_BASE64) {
        return None;
    }
    BASE64_PARSERS_BY_CONTENT_TYPE
        .get(essence(content_type).as_str())
        .map(Box::as_ref)
}

/// Whether a content type names a JSON payload.
#[must_use]
pub fn is_json(content_type: &str) -> bool {
    let essence = essence(content_type);
    essence == mime::JSON || essence == mime::CE_JSON
}

/// Render any input as canonical timestamp text.
///
/// Never fails: unparseable input becomes the current time.
#[must_use]
pub fn parse_date(input: &str) -> String {
    time::canonicalize(input)
}
