//! Structured mode: the whole envelope is one JSON body.

use super::mapping::{structured_inbound, Transform};
use super::{check_version_header, sanitize, Body, Headers, Message};
use crate::constants::{
    mime, DATA_ATTRIBUTE, DATA_BASE64_ATTRIBUTE, ENCODING_BASE64, HEADER_CONTENT_TYPE,
};
use crate::domain::{Attribute, Event, PropertyBag, PropertyValue, SpecVersion};
use crate::error::{EventError, ValidationError};
use crate::parsers::parser_for;
use serde_json::Value;
use tracing::trace;

/// Encode `event` as a structured-mode message. Never fails.
///
/// When `data_base64` is set it alone carries the payload.
#[must_use]
pub fn encode(event: &Event) -> Message {
    let rendered = if event.data_base64().is_some() {
        event.without_data().to_string()
    } else {
        event.to_string()
    };
    let mut headers = Headers::new();
    headers.insert(
        HEADER_CONTENT_TYPE.to_string(),
        mime::DEFAULT_CE_CONTENT_TYPE.to_string(),
    );
    trace!(id = event.id(), bytes = rendered.len(), "encoded structured message");
    Message {
        headers,
        body: Some(Body::Text(rendered)),
    }
}

/// Decode a structured-mode message using the `version` attribute table.
///
/// The result is not validated.
///
/// # Errors
///
/// - [`ValidationError::MissingBody`] / [`ValidationError::MissingHeaders`].
/// - [`ValidationError::InvalidBody`] unless the body holds a JSON object.
/// - [`ValidationError::InvalidContentType`] without a registered parser.
/// - [`ValidationError::InvalidEncodedData`] for undecodable base64 data.
pub fn decode(message: &Message, version: SpecVersion) -> Result<Event, EventError> {
    let body = message.payload().ok_or(ValidationError::MissingBody)?;
    if message.headers.is_empty() {
        return Err(ValidationError::MissingHeaders.into());
    }
    if !body.is_string_or_object() {
        return Err(ValidationError::InvalidBody(format!(
            "invalid payload type, allowed are: string or object, got {body:?}"
        ))
        .into());
    }

    let headers = sanitize(&message.headers);
    check_version_header(&headers)?;

    let content_type = headers
        .get(HEADER_CONTENT_TYPE)
        .map(String::as_str)
        .unwrap_or(mime::JSON);
    let parser = parser_for(content_type)
        .ok_or_else(|| ValidationError::InvalidContentType(content_type.to_string()))?;
    let mut incoming = match parser.parse(body.clone())? {
        Body::Json(Value::Object(map)) => map,
        other => {
            return Err(ValidationError::InvalidBody(format!(
                "structured payload must be an object, got {other:?}"
            ))
            .into())
        }
    };

    let mut properties = PropertyBag::new();
    for (key, mapping) in structured_inbound(version).iter() {
        if let Some(value) = incoming.remove(key).filter(|v| !v.is_null()) {
            properties.insert(mapping.name, mapping.apply(value.into())?);
        }
    }
    for (key, value) in incoming {
        if !value.is_null() {
            properties.insert(key, value);
        }
    }

    decode_binary_payload(&mut properties)?;
    Event::new(properties, false)
}

/// Replace base64-carried data with raw bytes and drop the markers.
fn decode_binary_payload(properties: &mut PropertyBag) -> Result<(), ValidationError> {
    let encoded = if properties.contains(DATA_BASE64_ATTRIBUTE) {
        properties.get(DATA_BASE64_ATTRIBUTE).cloned()
    } else {
        let base64_encoded = properties
            .get(Attribute::DataContentEncoding.name())
            .and_then(PropertyValue::as_str)
            .is_some_and(|enc| enc.eq_ignore_ascii_case(ENCODING_BASE64));
        if base64_encoded {
            properties.get(DATA_ATTRIBUTE).cloned()
        } else {
            None
        }
    };

    if let Some(encoded) = encoded {
        let bytes = Transform::Base64Decode.apply(encoded)?;
        properties.insert(DATA_ATTRIBUTE, bytes);
        properties.remove(DATA_BASE64_ATTRIBUTE);
        properties.remove(Attribute::DataContentEncoding.name());
    }
    Ok(())
}
