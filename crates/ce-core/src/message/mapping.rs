//! # Attribute Mapping Tables
//!
//! Static, read-only correspondences between envelope attributes and wire
//! field names, per version and direction:
//!
//! | Table | Keyed by | Yields |
//! |-------|----------|--------|
//! | `V1_OUTBOUND`, `V03_OUTBOUND` | attribute | header name |
//! | `V1_BINARY_INBOUND`, `V03_BINARY_INBOUND` | header name | attribute |
//! | `V1_STRUCTURED_INBOUND`, `V03_STRUCTURED_INBOUND` | attribute | attribute |
//!
//! Anything absent from a table is an extension.

use crate::constants::{headers, HEADER_CONTENT_TYPE};
use crate::domain::{PropertyValue, SpecVersion};
use crate::error::ValidationError;
use crate::parsers::parse_date;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

/// A value transform applied while mapping a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Identity,
    /// Render as canonical timestamp text; never fails.
    Date,
    /// base64 text → raw bytes.
    Base64Decode,
}

impl Transform {
    /// Apply this transform to a value.
    ///
    /// # Errors
    ///
    /// Only [`Transform::Base64Decode`] can fail, on non-base64 input.
    pub fn apply(self, value: PropertyValue) -> Result<PropertyValue, ValidationError> {
        match self {
            Transform::Identity => Ok(value),
            Transform::Date => {
                let text = match &value {
                    PropertyValue::Json(Value::String(s)) => s.clone(),
                    other => other.to_wire_text().unwrap_or_default(),
                };
                Ok(PropertyValue::from(parse_date(&text)))
            }
            Transform::Base64Decode => match value {
                PropertyValue::Json(Value::String(text)) => STANDARD
                    .decode(text.trim())
                    .map(PropertyValue::Binary)
                    .map_err(|e| ValidationError::InvalidEncodedData(format!("{text}: {e}"))),
                PropertyValue::Binary(bytes) => Ok(PropertyValue::Binary(bytes)),
                PropertyValue::Json(other) => {
                    Err(ValidationError::InvalidEncodedData(other.to_string()))
                }
            },
        }
    }
}

/// Target name plus the transforms applied in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub name: &'static str,
    pub transforms: &'static [Transform],
}

impl FieldMapping {
    const fn to(name: &'static str) -> Self {
        Self {
            name,
            transforms: &[Transform::Identity],
        }
    }

    const fn date(name: &'static str) -> Self {
        Self {
            name,
            transforms: &[Transform::Date],
        }
    }

    /// Run every transform over `value`.
    ///
    /// # Errors
    ///
    /// Propagates the first failing transform.
    pub fn apply(&self, value: PropertyValue) -> Result<PropertyValue, ValidationError> {
        self.transforms
            .iter()
            .try_fold(value, |value, transform| transform.apply(value))
    }
}

/// An ordered, read-only mapping table.
#[derive(Debug)]
pub struct MappingTable {
    entries: &'static [(&'static str, FieldMapping)],
}

impl MappingTable {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldMapping> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, mapping)| mapping)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldMapping)> {
        self.entries.iter().map(|(k, mapping)| (*k, mapping))
    }
}

pub static V1_OUTBOUND: MappingTable = MappingTable {
    entries: &[
        ("datacontenttype", FieldMapping::to(HEADER_CONTENT_TYPE)),
        ("subject", FieldMapping::to(headers::SUBJECT)),
        ("type", FieldMapping::to(headers::TYPE)),
        ("specversion", FieldMapping::to(headers::SPEC_VERSION)),
        ("source", FieldMapping::to(headers::SOURCE)),
        ("id", FieldMapping::to(headers::ID)),
        ("time", FieldMapping::to(headers::TIME)),
        ("dataschema", FieldMapping::to(headers::DATA_SCHEMA)),
    ],
};

pub static V03_OUTBOUND: MappingTable = MappingTable {
    entries: &[
        ("datacontenttype", FieldMapping::to(HEADER_CONTENT_TYPE)),
        ("subject", FieldMapping::to(headers::SUBJECT)),
        ("type", FieldMapping::to(headers::TYPE)),
        ("specversion", FieldMapping::to(headers::SPEC_VERSION)),
        ("source", FieldMapping::to(headers::SOURCE)),
        ("id", FieldMapping::to(headers::ID)),
        ("time", FieldMapping::to(headers::TIME)),
        ("datacontentencoding", FieldMapping::to(headers::CONTENT_ENCODING)),
        ("schemaurl", FieldMapping::to(headers::SCHEMA_URL)),
    ],
};

pub static V1_BINARY_INBOUND: MappingTable = MappingTable {
    entries: &[
        (headers::TYPE, FieldMapping::to("type")),
        (headers::SPEC_VERSION, FieldMapping::to("specversion")),
        (headers::SOURCE, FieldMapping::to("source")),
        (headers::ID, FieldMapping::to("id")),
        (headers::TIME, FieldMapping::date("time")),
        (headers::DATA_SCHEMA, FieldMapping::to("dataschema")),
        (headers::SUBJECT, FieldMapping::to("subject")),
        (HEADER_CONTENT_TYPE, FieldMapping::to("datacontenttype")),
    ],
};

pub static V03_BINARY_INBOUND: MappingTable = MappingTable {
    entries: &[
        (headers::TYPE, FieldMapping::to("type")),
        (headers::SPEC_VERSION, FieldMapping::to("specversion")),
        (headers::SOURCE, FieldMapping::to("source")),
        (headers::ID, FieldMapping::to("id")),
        (headers::TIME, FieldMapping::date("time")),
        (headers::SCHEMA_URL, FieldMapping::to("schemaurl")),
        (headers::SUBJECT, FieldMapping::to("subject")),
        (headers::CONTENT_ENCODING, FieldMapping::to("datacontentencoding")),
        (HEADER_CONTENT_TYPE, FieldMapping::to("datacontenttype")),
    ],
};

pub static V1_STRUCTURED_INBOUND: MappingTable = MappingTable {
    entries: &[
        ("type", FieldMapping::to("type")),
        ("specversion", FieldMapping::to("specversion")),
        ("source", FieldMapping::to("source")),
        ("id", FieldMapping::to("id")),
        ("time", FieldMapping::date("time")),
        ("dataschema", FieldMapping::to("dataschema")),
        ("datacontenttype", FieldMapping::to("datacontenttype")),
        ("subject", FieldMapping::to("subject")),
        ("data", FieldMapping::to("data")),
        ("data_base64", FieldMapping::to("data_base64")),
    ],
};

pub static V03_STRUCTURED_INBOUND: MappingTable = MappingTable {
    entries: &[
        ("type", FieldMapping::to("type")),
        ("specversion", FieldMapping::to("specversion")),
        ("source", FieldMapping::to("source")),
        ("id", FieldMapping::to("id")),
        ("time", FieldMapping::date("time")),
        ("schemaurl", FieldMapping::to("schemaurl")),
        ("datacontentencoding", FieldMapping::to("datacontentencoding")),
        ("datacontenttype", FieldMapping::to("datacontenttype")),
        ("subject", FieldMapping::to("subject")),
        ("data", FieldMapping::to("data")),
    ],
};

/// Attribute → header table for binary encoding.
#[must_use]
pub fn outbound(version: SpecVersion) -> &'static MappingTable {
    match version {
        SpecVersion::V1 => &V1_OUTBOUND,
        SpecVersion::V03 => &V03_OUTBOUND,
    }
}

/// Header → attribute table for binary decoding.
#[must_use]
pub fn binary_inbound(version: SpecVersion) -> &'static MappingTable {
    match version {
        SpecVersion::V1 => &V1_BINARY_INBOUND,
        SpecVersion::V03 => &V03_BINARY_INBOUND,
    }
}

/// Attribute → attribute table for structured decoding.
#[must_use]
pub fn structured_inbound(version: SpecVersion) -> &'static MappingTable {
    match version {
        SpecVersion::V1 => &V1_STRUCTURED_INBOUND,
        SpecVersion::V03 => &V03_STRUCTURED_INBOUND,
    }
}
