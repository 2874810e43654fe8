//! Mode and version detection for inbound messages.

use super::{sanitize, Body, Headers};
use crate::constants::{headers as ce_headers, mime, HEADER_CONTENT_TYPE};
use crate::domain::{Attribute, Mode, SpecVersion};
use crate::error::ValidationError;
use serde_json::Value;
use tracing::warn;

/// Classify a message by its headers.
///
/// A `content-type` starting with `application/cloudevents` is structured;
/// otherwise a `ce-id` header makes it binary.
///
/// # Errors
///
/// [`ValidationError::NoEventDetected`] when neither applies.
pub fn detect_mode(headers: &Headers) -> Result<Mode, ValidationError> {
    let headers = sanitize(headers);
    let structured = headers
        .get(HEADER_CONTENT_TYPE)
        .is_some_and(|ct| ct.to_ascii_lowercase().starts_with(mime::CE));
    if structured {
        Ok(Mode::Structured)
    } else if headers.contains_key(ce_headers::ID) {
        Ok(Mode::Binary)
    } else {
        Err(ValidationError::NoEventDetected)
    }
}

/// Determine the declared version of a message in `mode`.
///
/// Unrecognized versions fall back to 1.0 with a warning.
///
/// # Errors
///
/// [`ValidationError::Parse`] when a structured body is not valid JSON.
pub fn detect_version(
    mode: Mode,
    headers: &Headers,
    body: Option<&Body>,
) -> Result<SpecVersion, ValidationError> {
    let declared = match mode {
        Mode::Binary => sanitize(headers).get(ce_headers::SPEC_VERSION).cloned(),
        Mode::Structured => match body {
            Some(body) => structured_version(body)?,
            None => None,
        },
    };

    let Some(declared) = declared else {
        return Ok(SpecVersion::default());
    };
    Ok(SpecVersion::parse(&declared).unwrap_or_else(|| {
        warn!(version = %declared, "unknown specversion, assuming {}", SpecVersion::V1);
        SpecVersion::V1
    }))
}

fn structured_version(body: &Body) -> Result<Option<String>, ValidationError> {
    let parsed;
    let object = match body {
        Body::Json(Value::Object(map)) => map,
        Body::Text(text) | Body::Json(Value::String(text)) => {
            parsed = serde_json::from_str::<Value>(text)?;
            match &parsed {
                Value::Object(map) => map,
                _ => return Ok(None),
            }
        }
        Body::Bytes(bytes) => {
            parsed = serde_json::from_slice::<Value>(bytes)?;
            match &parsed {
                Value::Object(map) => map,
                _ => return Ok(None),
            }
        }
        Body::Json(_) => return Ok(None),
    };
    Ok(object
        .get(Attribute::SpecVersion.name())
        .map(|version| match version {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_structured_by_content_type() {
        let h = headers(&[("Content-Type", "application/cloudevents+json; charset=utf-8")]);
        assert_eq!(detect_mode(&h), Ok(Mode::Structured));
    }

    #[test]
    fn test_binary_by_id_header() {
        let h = headers(&[("CE-ID", "1"), ("content-type", "text/plain")]);
        assert_eq!(detect_mode(&h), Ok(Mode::Binary));
    }

    #[test]
    fn test_structured_wins_over_id() {
        let h = headers(&[("ce-id", "1"), ("content-type", "application/cloudevents+json")]);
        assert_eq!(detect_mode(&h), Ok(Mode::Structured));
    }

    #[test]
    fn test_nothing_detected() {
        let h = headers(&[("content-type", "application/json")]);
        assert_eq!(detect_mode(&h), Err(ValidationError::NoEventDetected));
        assert_eq!(
            detect_mode(&Headers::new()),
            Err(ValidationError::NoEventDetected)
        );
    }

    #[test]
    fn test_binary_version_from_header() {
        let h = headers(&[("Ce-SpecVersion", "0.3")]);
        assert_eq!(detect_version(Mode::Binary, &h, None), Ok(SpecVersion::V03));
    }

    #[test]
    fn test_structured_version_from_body() {
        let body = Body::Text(json!({"specversion": "0.3"}).to_string());
        assert_eq!(
            detect_version(Mode::Structured, &Headers::new(), Some(&body)),
            Ok(SpecVersion::V03)
        );
        let body = Body::Json(json!({"specversion": "1.0"}));
        assert_eq!(
            detect_version(Mode::Structured, &Headers::new(), Some(&body)),
            Ok(SpecVersion::V1)
        );
    }

    #[test]
    fn test_unknown_version_coerced() {
        let h = headers(&[("ce-specversion", "2.0")]);
        assert_eq!(detect_version(Mode::Binary, &h, None), Ok(SpecVersion::V1));
    }

    #[test]
    fn test_missing_version_defaults() {
        assert_eq!(
            detect_version(Mode::Binary, &Headers::new(), None),
            Ok(SpecVersion::V1)
        );
        assert_eq!(
            detect_version(Mode::Structured, &Headers::new(), None),
            Ok(SpecVersion::V1)
        );
    }

    #[test]
    fn test_malformed_structured_body() {
        let body = Body::Text("{oops".into());
        assert!(matches!(
            detect_version(Mode::Structured, &Headers::new(), Some(&body)),
            Err(ValidationError::Parse(_))
        ));
    }
}
