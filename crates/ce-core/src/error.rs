//! # Error Types
//!
//! Construction failures and structural validation failures for envelopes
//! and wire messages.

use thiserror::Error;

/// Errors raised while building or checking an [`Event`](crate::Event).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// A version-specific attribute was set on the wrong version.
    ///
    /// Always fatal, regardless of strictness.
    #[error("cannot set {attribute} on version {version} event")]
    Construction {
        attribute: &'static str,
        version: String,
    },

    /// The envelope does not conform to its version's constraints.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl EventError {
    /// Returns true for cross-field version violations.
    #[must_use]
    pub fn is_construction(&self) -> bool {
        matches!(self, EventError::Construction { .. })
    }

    /// The validation failure, if this is one.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            EventError::Validation(e) => Some(e),
            EventError::Construction { .. } => None,
        }
    }
}

/// Structural non-conformance of an envelope or of a wire message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more schema constraints were violated.
    #[error("invalid payload: {}", violations.join("; "))]
    InvalidPayload { violations: Vec<String> },

    /// Extension names are lower-case ASCII letters and digits, 1-20 chars.
    #[error("invalid extension name: {0}")]
    InvalidExtensionName(String),

    /// Extension value outside the envelope type system.
    #[error("invalid extension value for {name}: {value}")]
    InvalidExtensionValue { name: String, value: String },

    /// Only base64 content encoding is supported.
    #[error("unsupported content encoding: {0}")]
    UnsupportedEncoding(String),

    /// Data declared as base64 is not valid base64 text.
    #[error("invalid content encoding of data: {0}")]
    InvalidEncodedData(String),

    /// Declared spec version is neither 1.0 nor 0.3.
    #[error("invalid spec version {0}")]
    InvalidSpecVersion(String),

    #[error("headers are missing")]
    MissingHeaders,

    #[error("payload is missing")]
    MissingBody,

    /// Body is not text, bytes, or a JSON object/array.
    #[error("payload must be an object or a string: {0}")]
    InvalidBody(String),

    /// No payload parser is registered for the content type.
    #[error("invalid content type {0}")]
    InvalidContentType(String),

    /// Neither an envelope content type nor an id field is present.
    #[error("no cloud event detected")]
    NoEventDetected,

    /// The JSON parser rejected the payload.
    #[error("unable to parse payload: {0}")]
    Parse(String),
}

impl ValidationError {
    /// The individual violated constraints, for diagnostics.
    #[must_use]
    pub fn violations(&self) -> Vec<String> {
        match self {
            ValidationError::InvalidPayload { violations } => violations.clone(),
            other => vec![other.to_string()],
        }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(e: serde_json::Error) -> Self {
        ValidationError::Parse(e.to_string())
    }
}
