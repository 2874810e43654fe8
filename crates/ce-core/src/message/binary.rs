//! Binary mode: attributes travel as headers, `data` is the raw body.

use super::mapping::{binary_inbound, outbound};
use super::{check_version_header, sanitize, Body, Headers, Message};
use crate::constants::{
    headers as ce_headers, mime, DATA_ATTRIBUTE, DATA_BASE64_ATTRIBUTE, ENCODING_BASE64,
    EXTENSIONS_PREFIX, HEADER_CONTENT_TYPE,
};
use crate::domain::{Attribute, Data, Event, PropertyBag, PropertyValue, SpecVersion};
use crate::error::{EventError, ValidationError};
use crate::parsers::{essence, is_json, parse_date, parser_for, parser_for_encoding};
use serde_json::Value;
use tracing::trace;

/// Encode `event` as a binary-mode message. Never fails.
#[must_use]
pub fn encode(event: &Event) -> Message {
    let table = outbound(event.spec_version().unwrap_or_default());
    let mut headers = Headers::new();
    headers.insert(
        HEADER_CONTENT_TYPE.to_string(),
        mime::DEFAULT_CONTENT_TYPE.to_string(),
    );

    for (name, value) in event.to_snapshot() {
        if name == DATA_ATTRIBUTE || name == DATA_BASE64_ATTRIBUTE {
            continue;
        }
        let Some(text) = PropertyValue::Json(value).to_wire_text() else {
            continue;
        };
        let header = match table.get(&name) {
            Some(mapping) => mapping.name.to_string(),
            None => format!("{EXTENSIONS_PREFIX}{name}"),
        };
        headers.insert(header, text);
    }
    headers.insert(ce_headers::TIME.to_string(), parse_date(event.time()));

    let json_content = is_json(event.datacontenttype().unwrap_or(mime::DEFAULT_CONTENT_TYPE));
    let body = event.data().map(|data| match data {
        Data::Json(Value::String(text)) if !json_content => Body::Text(text.clone()),
        Data::Json(value) => Body::Text(value.to_string()),
        Data::Binary(bytes) => Body::Bytes(bytes.clone()),
    });
    trace!(id = event.id(), headers = headers.len(), "encoded binary message");
    Message { headers, body }
}

/// Decode a binary-mode message using the `version` header table.
///
/// The result is not validated.
///
/// # Errors
///
/// - [`ValidationError::MissingHeaders`] for an empty header map.
/// - [`ValidationError::InvalidBody`] for a primitive, non-string body.
/// - [`ValidationError::InvalidSpecVersion`] for an unsupported version header.
/// - Parser errors for a body that does not match its content type.
pub fn decode(message: &Message, version: SpecVersion) -> Result<Event, EventError> {
    if message.headers.is_empty() {
        return Err(ValidationError::MissingHeaders.into());
    }
    let body = message.payload();
    if let Some(body) = body {
        if !body.is_string_or_object() {
            return Err(ValidationError::InvalidBody(format!(
                "invalid payload type, allowed are: string or object, got {body:?}"
            ))
            .into());
        }
    }

    let mut headers = sanitize(&message.headers);
    check_version_header(&headers)?;

    let mut properties = PropertyBag::new();
    for (wire, mapping) in binary_inbound(version).iter() {
        if let Some(value) = headers.remove(wire).filter(|v| !v.is_empty()) {
            properties.insert(mapping.name, mapping.apply(value.into())?);
        }
    }
    for (name, value) in headers {
        if let Some(extension) = name.strip_prefix(EXTENSIONS_PREFIX) {
            properties.insert(extension, value);
        }
    }

    let content_type = text_property(&properties, Attribute::DataContentType);
    let encoding = text_property(&properties, Attribute::DataContentEncoding);
    let parser = match (&encoding, &content_type) {
        (Some(encoding), Some(content_type)) => {
            parser_for_encoding(encoding, content_type).or_else(|| parser_for(content_type))
        }
        (None, Some(content_type)) => parser_for(content_type),
        _ => None,
    };

    let base64_encoded = encoding
        .as_deref()
        .is_some_and(|enc| enc.eq_ignore_ascii_case(ENCODING_BASE64));

    // Raw bytes are binary data unless they carry base64 text.
    if let Some(body) = body {
        let data = match (body, parser) {
            (Body::Bytes(_), _) if !base64_encoded => body.clone(),
            (_, Some(parser)) => parser.parse(body.clone())?,
            (_, None) => body.clone(),
        };
        properties.insert(DATA_ATTRIBUTE, PropertyValue::from(data));
    }

    let json_content = content_type
        .as_deref()
        .is_some_and(|ct| essence(ct) == mime::JSON);
    if json_content && base64_encoded {
        properties.remove(Attribute::DataContentEncoding.name());
    }

    Event::new(properties, false)
}

fn text_property(properties: &PropertyBag, attribute: Attribute) -> Option<String> {
    properties
        .get(attribute.name())
        .and_then(PropertyValue::as_str)
        .map(str::to_string)
}
