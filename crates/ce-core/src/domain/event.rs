//! # Event Envelope
//!
//! The immutable event value object. An [`Event`] is built once from a
//! [`PropertyBag`] and never changes afterwards; "modifications" produce a
//! new event via [`Event::clone_with`].
//!
//! ## Construction
//!
//! - Known attributes are consumed and defaulted (`id` → UUID v4,
//!   `time` → now, `specversion` → 1.0).
//! - `dataschema` on 0.3 or `schemaurl` on 1.0 is always fatal.
//! - Everything else is an extension. Strict construction checks extension
//!   names and value kinds, then validates the whole envelope; lenient
//!   construction accepts leftovers verbatim so that wire input can be
//!   assembled first and validated later.
//! - Binary `data` derives `data_base64` as part of construction.

use super::property::{
    extension_kind, is_valid_extension_name, Attribute, Property, PropertyBag, PropertyValue,
};
use super::time::{format_timestamp, now, parse_timestamp};
use super::validation;
use super::version::SpecVersion;
use crate::error::{EventError, ValidationError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// An event payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// Any structured JSON value.
    Json(Value),
    /// Raw bytes.
    Binary(Vec<u8>),
}

impl Data {
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self, Data::Binary(_))
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Data::Json(v) => Some(v),
            Data::Binary(_) => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Data::Binary(b) => Some(b),
            Data::Json(_) => None,
        }
    }
}

impl From<PropertyValue> for Data {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Json(v) => Data::Json(v),
            PropertyValue::Binary(b) => Data::Binary(b),
        }
    }
}

impl From<Data> for PropertyValue {
    fn from(data: Data) -> Self {
        match data {
            Data::Json(v) => PropertyValue::Json(v),
            Data::Binary(b) => PropertyValue::Binary(b),
        }
    }
}

/// An immutable event envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    id: String,
    source: Option<String>,
    event_type: Option<String>,
    /// Raw version text; lenient construction keeps unknown values.
    specversion: String,
    time: String,
    datacontenttype: Option<String>,
    subject: Option<String>,
    dataschema: Option<String>,
    schemaurl: Option<String>,
    datacontentencoding: Option<String>,
    data_base64: Option<String>,
    data: Option<Data>,
    extensions: BTreeMap<String, PropertyValue>,
}

/// Text content of a known string attribute.
///
/// Null counts as unset. Empty text is kept so validation can reject it;
/// only `id`, `time` and `specversion` fall back to defaults when empty.
/// Strict construction rejects non-string values; lenient construction
/// keeps their JSON text.
fn text_attribute(
    attribute: Attribute,
    value: PropertyValue,
    strict: bool,
) -> Result<Option<String>, ValidationError> {
    match value {
        PropertyValue::Json(Value::Null) => Ok(None),
        PropertyValue::Json(Value::String(s)) => Ok(Some(s)),
        _ if strict => Err(ValidationError::InvalidPayload {
            violations: vec![format!("{}: must be string", attribute.name())],
        }),
        other => Ok(other.to_wire_text()),
    }
}

impl Event {
    /// Build an event from a property bag.
    ///
    /// # Errors
    ///
    /// - [`EventError::Construction`] for version/schema-field conflicts.
    /// - [`EventError::Validation`] (strict only) for invalid extensions or
    ///   a non-conforming envelope.
    pub fn new(properties: PropertyBag, strict: bool) -> Result<Self, EventError> {
        let mut event = Event {
            id: String::new(),
            source: None,
            event_type: None,
            specversion: String::new(),
            time: String::new(),
            datacontenttype: None,
            subject: None,
            dataschema: None,
            schemaurl: None,
            datacontentencoding: None,
            data_base64: None,
            data: None,
            extensions: BTreeMap::new(),
        };

        let mut extensions = Vec::new();
        for property in properties.into_properties() {
            match property {
                Property::Known(Attribute::Data, value) => event.data = Some(value.into()),
                Property::Known(attribute, value) => {
                    let text = text_attribute(attribute, value, strict)?;
                    match attribute {
                        Attribute::Id => event.id = text.unwrap_or_default(),
                        Attribute::Source => event.source = text,
                        Attribute::Type => event.event_type = text,
                        Attribute::SpecVersion => event.specversion = text.unwrap_or_default(),
                        Attribute::Time => event.time = text.unwrap_or_default(),
                        Attribute::DataContentType => event.datacontenttype = text,
                        Attribute::Subject => event.subject = text,
                        Attribute::DataSchema => event.dataschema = text,
                        Attribute::SchemaUrl => event.schemaurl = text,
                        Attribute::DataContentEncoding => event.datacontentencoding = text,
                        Attribute::DataBase64 => event.data_base64 = text,
                        Attribute::Data => {}
                    }
                }
                Property::Extension(name, value) => extensions.push((name, value)),
            }
        }

        if event.id.is_empty() {
            event.id = Uuid::new_v4().to_string();
        }
        if event.time.is_empty() {
            event.time = now();
        }
        if event.specversion.is_empty() {
            event.specversion = SpecVersion::default().as_str().to_string();
        }
        if let Some(Data::Binary(bytes)) = &event.data {
            event.data_base64 = Some(STANDARD.encode(bytes));
        }

        event.check_version_fields()?;

        for (name, value) in extensions {
            if strict {
                if !is_valid_extension_name(&name) {
                    return Err(ValidationError::InvalidExtensionName(name).into());
                }
                if extension_kind(&value).is_none() {
                    let rendered = value.to_json().to_string();
                    return Err(ValidationError::InvalidExtensionValue {
                        name,
                        value: rendered,
                    }
                    .into());
                }
            }
            event.extensions.insert(name, value);
        }

        if strict {
            event.validate()?;
        }
        Ok(event)
    }

    /// Start a fluent, strictly validated construction.
    #[must_use]
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    /// Build an event from a plain snapshot.
    ///
    /// # Errors
    ///
    /// See [`Event::new`].
    pub fn from_snapshot(snapshot: Map<String, Value>, strict: bool) -> Result<Self, EventError> {
        Self::new(snapshot.into(), strict)
    }

    fn check_version_fields(&self) -> Result<(), EventError> {
        match SpecVersion::parse(&self.specversion) {
            Some(SpecVersion::V1) if self.schemaurl.is_some() => Err(EventError::Construction {
                attribute: "schemaurl",
                version: self.specversion.clone(),
            }),
            Some(SpecVersion::V03) if self.dataschema.is_some() => {
                Err(EventError::Construction {
                    attribute: "dataschema",
                    version: self.specversion.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Validate this event against its declared version.
    ///
    /// # Errors
    ///
    /// Returns the violated constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(&self.to_snapshot(), &self.specversion)
    }

    /// Plain attribute snapshot.
    ///
    /// `time` is rendered canonically and binary `data` is omitted, since
    /// `data_base64` already carries it.
    #[must_use]
    pub fn to_snapshot(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let mut put = |attribute: Attribute, value: &Option<String>| {
            if let Some(v) = value {
                map.insert(attribute.name().to_string(), Value::String(v.clone()));
            }
        };
        put(Attribute::Id, &Some(self.id.clone()));
        put(Attribute::Source, &self.source);
        put(Attribute::Type, &self.event_type);
        put(Attribute::SpecVersion, &Some(self.specversion.clone()));
        put(Attribute::Time, &Some(self.canonical_time()));
        put(Attribute::DataContentType, &self.datacontenttype);
        put(Attribute::Subject, &self.subject);
        put(Attribute::DataSchema, &self.dataschema);
        put(Attribute::SchemaUrl, &self.schemaurl);
        put(Attribute::DataContentEncoding, &self.datacontentencoding);
        put(Attribute::DataBase64, &self.data_base64);

        if let Some(Data::Json(value)) = &self.data {
            map.insert(Attribute::Data.name().to_string(), value.clone());
        }
        for (name, value) in &self.extensions {
            map.insert(name.clone(), value.to_json());
        }
        map
    }

    /// New event from this one's snapshot merged with `overrides`.
    ///
    /// Binary data is carried forward unless `data` is overridden. The
    /// source event is untouched.
    ///
    /// # Errors
    ///
    /// See [`Event::new`].
    pub fn clone_with(&self, overrides: PropertyBag, strict: bool) -> Result<Event, EventError> {
        let mut properties = PropertyBag::from(self.to_snapshot());
        if overrides.contains(Attribute::Data.name()) {
            if !overrides.contains(Attribute::DataBase64.name()) {
                properties.remove(Attribute::DataBase64.name());
            }
        } else if let Some(Data::Binary(bytes)) = &self.data {
            properties.insert(Attribute::Data.name(), bytes.clone());
        }
        properties.merge(overrides);
        Event::new(properties, strict)
    }

    /// Copy of this event with `data` dropped; `data_base64` stays.
    #[must_use]
    pub(crate) fn without_data(&self) -> Event {
        Event {
            data: None,
            ..self.clone()
        }
    }

    fn canonical_time(&self) -> String {
        parse_timestamp(&self.time)
            .map(|dt| format_timestamp(&dt))
            .unwrap_or_else(|| self.time.clone())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn event_type(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    /// Declared version text, as constructed.
    #[must_use]
    pub fn specversion(&self) -> &str {
        &self.specversion
    }

    /// Declared version, if it is a supported one.
    #[must_use]
    pub fn spec_version(&self) -> Option<SpecVersion> {
        SpecVersion::parse(&self.specversion)
    }

    /// Time as supplied at construction.
    #[must_use]
    pub fn time(&self) -> &str {
        &self.time
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.time)
    }

    #[must_use]
    pub fn datacontenttype(&self) -> Option<&str> {
        self.datacontenttype.as_deref()
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    #[must_use]
    pub fn dataschema(&self) -> Option<&str> {
        self.dataschema.as_deref()
    }

    #[must_use]
    pub fn schemaurl(&self) -> Option<&str> {
        self.schemaurl.as_deref()
    }

    #[must_use]
    pub fn datacontentencoding(&self) -> Option<&str> {
        self.datacontentencoding.as_deref()
    }

    #[must_use]
    pub fn data_base64(&self) -> Option<&str> {
        self.data_base64.as_deref()
    }

    #[must_use]
    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn extension(&self, name: &str) -> Option<&PropertyValue> {
        self.extensions.get(name)
    }

    #[must_use]
    pub fn extensions(&self) -> &BTreeMap<String, PropertyValue> {
        &self.extensions
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_snapshot().serialize(serializer)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Value::Object(self.to_snapshot()).to_string())
    }
}

/// Fluent builder for strictly validated events.
///
/// # Example
///
/// ```ignore
/// let event = Event::builder()
///     .source("/orders")
///     .event_type("order.created")
///     .data(json!({"id": 7}))
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventBuilder {
    properties: PropertyBag,
}

impl EventBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn set(mut self, attribute: Attribute, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(attribute.name(), value);
        self
    }

    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.set(Attribute::Id, id.into())
    }

    #[must_use]
    pub fn source(self, source: impl Into<String>) -> Self {
        self.set(Attribute::Source, source.into())
    }

    #[must_use]
    pub fn event_type(self, event_type: impl Into<String>) -> Self {
        self.set(Attribute::Type, event_type.into())
    }

    #[must_use]
    pub fn spec_version(self, version: SpecVersion) -> Self {
        self.set(Attribute::SpecVersion, version.as_str())
    }

    #[must_use]
    pub fn time(self, time: impl Into<String>) -> Self {
        self.set(Attribute::Time, time.into())
    }

    #[must_use]
    pub fn time_at(self, time: DateTime<Utc>) -> Self {
        self.set(Attribute::Time, format_timestamp(&time))
    }

    #[must_use]
    pub fn datacontenttype(self, content_type: impl Into<String>) -> Self {
        self.set(Attribute::DataContentType, content_type.into())
    }

    #[must_use]
    pub fn subject(self, subject: impl Into<String>) -> Self {
        self.set(Attribute::Subject, subject.into())
    }

    #[must_use]
    pub fn dataschema(self, schema: impl Into<String>) -> Self {
        self.set(Attribute::DataSchema, schema.into())
    }

    #[must_use]
    pub fn schemaurl(self, schema: impl Into<String>) -> Self {
        self.set(Attribute::SchemaUrl, schema.into())
    }

    #[must_use]
    pub fn datacontentencoding(self, encoding: impl Into<String>) -> Self {
        self.set(Attribute::DataContentEncoding, encoding.into())
    }

    #[must_use]
    pub fn data(self, data: impl Into<Value>) -> Self {
        self.set(Attribute::Data, PropertyValue::Json(data.into()))
    }

    #[must_use]
    pub fn binary_data(self, bytes: impl Into<Vec<u8>>) -> Self {
        self.set(Attribute::Data, PropertyValue::Binary(bytes.into()))
    }

    #[must_use]
    pub fn extension(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name, value);
        self
    }

    /// Build with strict validation.
    ///
    /// # Errors
    ///
    /// See [`Event::new`].
    pub fn build(self) -> Result<Event, EventError> {
        Event::new(self.properties, true)
    }

    /// Build without structural validation.
    ///
    /// # Errors
    ///
    /// Only the version/schema-field conflict is reported.
    pub fn build_lenient(self) -> Result<Event, EventError> {
        Event::new(self.properties, false)
    }
}
