//! # Property Bag
//!
//! The construction input for an [`Event`](super::Event): an ordered map of
//! attribute names to values. Each entry is classified exactly once as a
//! known envelope attribute or as an extension, which replaces the
//! "delete each known key as you go" approach.

use super::uri::is_uri;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Value};
use std::collections::btree_map::{self, BTreeMap};

/// Longest allowed extension name.
pub const MAX_EXTENSION_NAME_LEN: usize = 20;

/// A single property value: any JSON value, or raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Json(Value),
    Binary(Vec<u8>),
}

impl PropertyValue {
    /// The value as text, when it is a JSON string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Json(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Json(Value::Null))
    }

    /// Render for a transport header. Null renders as nothing.
    #[must_use]
    pub fn to_wire_text(&self) -> Option<String> {
        match self {
            PropertyValue::Json(Value::Null) => None,
            PropertyValue::Json(Value::String(s)) => Some(s.clone()),
            PropertyValue::Json(other) => Some(other.to_string()),
            PropertyValue::Binary(bytes) => Some(STANDARD.encode(bytes)),
        }
    }

    /// Render as a JSON value; bytes become base64 text.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            PropertyValue::Json(v) => v.clone(),
            PropertyValue::Binary(bytes) => Value::String(STANDARD.encode(bytes)),
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(v: Value) -> Self {
        PropertyValue::Json(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Json(Value::String(s.to_string()))
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Json(Value::String(s))
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Json(Value::Bool(b))
    }
}

impl From<i32> for PropertyValue {
    fn from(n: i32) -> Self {
        PropertyValue::Json(Value::from(n))
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Json(Value::from(n))
    }
}

impl From<Vec<u8>> for PropertyValue {
    fn from(bytes: Vec<u8>) -> Self {
        PropertyValue::Binary(bytes)
    }
}

impl From<&[u8]> for PropertyValue {
    fn from(bytes: &[u8]) -> Self {
        PropertyValue::Binary(bytes.to_vec())
    }
}

/// Envelope attributes known to at least one supported version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Id,
    Source,
    Type,
    SpecVersion,
    Time,
    DataContentType,
    Subject,
    /// 1.0 only.
    DataSchema,
    /// 0.3 only.
    SchemaUrl,
    /// 0.3 only.
    DataContentEncoding,
    DataBase64,
    Data,
}

impl Attribute {
    pub const ALL: [Attribute; 12] = [
        Attribute::Id,
        Attribute::Source,
        Attribute::Type,
        Attribute::SpecVersion,
        Attribute::Time,
        Attribute::DataContentType,
        Attribute::Subject,
        Attribute::DataSchema,
        Attribute::SchemaUrl,
        Attribute::DataContentEncoding,
        Attribute::DataBase64,
        Attribute::Data,
    ];

    /// The attribute's name inside a snapshot.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Attribute::Id => "id",
            Attribute::Source => "source",
            Attribute::Type => "type",
            Attribute::SpecVersion => "specversion",
            Attribute::Time => "time",
            Attribute::DataContentType => "datacontenttype",
            Attribute::Subject => "subject",
            Attribute::DataSchema => "dataschema",
            Attribute::SchemaUrl => "schemaurl",
            Attribute::DataContentEncoding => "datacontentencoding",
            Attribute::DataBase64 => "data_base64",
            Attribute::Data => "data",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }
}

/// Result of classifying one bag entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Known(Attribute, PropertyValue),
    Extension(String, PropertyValue),
}

impl Property {
    #[must_use]
    pub fn classify(name: String, value: PropertyValue) -> Self {
        match Attribute::from_name(&name) {
            Some(attribute) => Property::Known(attribute, value),
            None => Property::Extension(name, value),
        }
    }
}

/// The closed set of primitive kinds an extension value may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    String,
    Boolean,
    Integer,
    Uri,
    Timestamp,
    Binary,
}

/// Classify an extension value, or `None` if it is outside the type system.
///
/// Integers are 32-bit signed. Strings are refined to timestamps (RFC 3339)
/// and absolute URIs where they parse as such.
#[must_use]
pub fn extension_kind(value: &PropertyValue) -> Option<ExtensionKind> {
    match value {
        PropertyValue::Binary(_) => Some(ExtensionKind::Binary),
        PropertyValue::Json(Value::Bool(_)) => Some(ExtensionKind::Boolean),
        PropertyValue::Json(Value::Number(n)) => n
            .as_i64()
            .filter(|i| i32::try_from(*i).is_ok())
            .map(|_| ExtensionKind::Integer),
        PropertyValue::Json(Value::String(s)) => {
            if chrono::DateTime::parse_from_rfc3339(s).is_ok() {
                Some(ExtensionKind::Timestamp)
            } else if is_uri(s) {
                Some(ExtensionKind::Uri)
            } else {
                Some(ExtensionKind::String)
            }
        }
        PropertyValue::Json(_) => None,
    }
}

/// Lower-case ASCII letters and digits, between 1 and 20 characters.
#[must_use]
pub fn is_valid_extension_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_EXTENSION_NAME_LEN
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Ordered construction input for an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    entries: BTreeMap<String, PropertyValue>,
}

impl PropertyBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.entries.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, PropertyValue> {
        self.entries.iter()
    }

    /// Overlay `other` on top of this bag; `other` wins on conflicts.
    pub fn merge(&mut self, other: PropertyBag) {
        self.entries.extend(other.entries);
    }

    /// Consume the bag, classifying every entry.
    pub fn into_properties(self) -> impl Iterator<Item = Property> {
        self.entries
            .into_iter()
            .map(|(name, value)| Property::classify(name, value))
    }
}

impl From<Map<String, Value>> for PropertyBag {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter()
            .map(|(k, v)| (k, PropertyValue::Json(v)))
            .collect()
    }
}

impl FromIterator<(String, PropertyValue)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PropertyBag {
    type Item = (String, PropertyValue);
    type IntoIter = btree_map::IntoIter<String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
