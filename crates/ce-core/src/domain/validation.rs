//! # Version Schema Validator
//!
//! Checks a plain event snapshot against the structural rules of its
//! declared version. Each version's rules live in a static constraint table
//! evaluated by [`validate`]; 0.3 adds a content-encoding check on top.

use super::time::parse_timestamp;
use super::uri::{is_uri, is_uri_reference};
use super::version::SpecVersion;
use crate::constants::ENCODING_BASE64;
use crate::error::ValidationError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Value};

/// A single value rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Exactly this string.
    Const(&'static str),
    /// Any string.
    String,
    /// A string of at least one character.
    NonEmptyString,
    /// An absolute URI.
    Uri,
    /// A URI or relative reference.
    UriReference,
    /// A string the permissive date parser accepts.
    DateTime,
    /// object, array, string, number, boolean or null.
    DataValue,
}

/// One attribute's constraint within a version schema.
#[derive(Debug, Clone, Copy)]
pub struct Constraint {
    pub attribute: &'static str,
    pub required: bool,
    pub rule: Rule,
}

const fn required(attribute: &'static str, rule: Rule) -> Constraint {
    Constraint {
        attribute,
        required: true,
        rule,
    }
}

const fn optional(attribute: &'static str, rule: Rule) -> Constraint {
    Constraint {
        attribute,
        required: false,
        rule,
    }
}

/// Version 1.0 schema.
pub const SCHEMA_V1: &[Constraint] = &[
    required("specversion", Rule::Const("1.0")),
    required("id", Rule::NonEmptyString),
    required("type", Rule::NonEmptyString),
    required("source", Rule::UriReference),
    optional("time", Rule::DateTime),
    optional("dataschema", Rule::Uri),
    optional("subject", Rule::NonEmptyString),
    optional("datacontenttype", Rule::String),
    optional("data", Rule::DataValue),
    optional("data_base64", Rule::String),
];

/// Version 0.3 schema.
pub const SCHEMA_V03: &[Constraint] = &[
    required("specversion", Rule::Const("0.3")),
    required("id", Rule::NonEmptyString),
    required("type", Rule::NonEmptyString),
    required("source", Rule::UriReference),
    optional("time", Rule::DateTime),
    optional("schemaurl", Rule::UriReference),
    optional("subject", Rule::NonEmptyString),
    optional("datacontenttype", Rule::String),
    optional("data", Rule::DataValue),
];

/// The constraint table for a version.
#[must_use]
pub fn schema_for(version: SpecVersion) -> &'static [Constraint] {
    match version {
        SpecVersion::V1 => SCHEMA_V1,
        SpecVersion::V03 => SCHEMA_V03,
    }
}

fn check_rule(rule: Rule, value: &Value) -> Result<(), String> {
    match (rule, value) {
        (Rule::Const(expected), Value::String(s)) if s == expected => Ok(()),
        (Rule::Const(expected), _) => Err(format!("must be equal to constant {expected}")),
        (Rule::String, Value::String(_)) => Ok(()),
        (Rule::NonEmptyString, Value::String(s)) if !s.is_empty() => Ok(()),
        (Rule::NonEmptyString, Value::String(_)) => Err("must not be empty".to_string()),
        (Rule::Uri, Value::String(s)) if is_uri(s) => Ok(()),
        (Rule::Uri, Value::String(_)) => Err("must match format \"uri\"".to_string()),
        (Rule::UriReference, Value::String(s)) if is_uri_reference(s) => Ok(()),
        (Rule::UriReference, Value::String(_)) => {
            Err("must match format \"uri-reference\"".to_string())
        }
        (Rule::DateTime, Value::String(s)) if parse_timestamp(s).is_some() => Ok(()),
        (Rule::DateTime, Value::String(_)) => Err("must match format \"date-time\"".to_string()),
        (Rule::DataValue, _) => Ok(()),
        (_, _) => Err("must be string".to_string()),
    }
}

fn check_schema(snapshot: &Map<String, Value>, schema: &[Constraint]) -> Vec<String> {
    schema
        .iter()
        .filter_map(|constraint| match snapshot.get(constraint.attribute) {
            None if constraint.required => Some(format!("{}: is required", constraint.attribute)),
            None => None,
            Some(value) => check_rule(constraint.rule, value)
                .err()
                .map(|reason| format!("{}: {reason}", constraint.attribute)),
        })
        .collect()
}

/// Valid base64 text under the standard alphabet.
#[must_use]
pub fn is_base64(text: &str) -> bool {
    STANDARD.decode(text).is_ok()
}

fn check_content_encoding(snapshot: &Map<String, Value>) -> Result<(), ValidationError> {
    let Some(encoding) = snapshot.get("datacontentencoding") else {
        return Ok(());
    };
    let encoding = match encoding {
        Value::String(s) => s.to_lowercase(),
        other => other.to_string(),
    };
    if encoding != ENCODING_BASE64 {
        return Err(ValidationError::UnsupportedEncoding(encoding));
    }
    match snapshot.get("data") {
        Some(Value::String(data)) if is_base64(data) => Ok(()),
        Some(other) => Err(ValidationError::InvalidEncodedData(match other {
            Value::String(s) => s.clone(),
            v => v.to_string(),
        })),
        None => Err(ValidationError::InvalidEncodedData("<missing>".to_string())),
    }
}

/// Validate `snapshot` against the schema of `version`.
///
/// # Errors
///
/// - [`ValidationError::InvalidSpecVersion`] for unsupported versions.
/// - [`ValidationError::InvalidPayload`] listing every violated constraint.
/// - [`ValidationError::UnsupportedEncoding`] / [`ValidationError::InvalidEncodedData`]
///   for 0.3 content-encoding problems.
pub fn validate(snapshot: &Map<String, Value>, version: &str) -> Result<(), ValidationError> {
    let version = SpecVersion::parse(version)
        .ok_or_else(|| ValidationError::InvalidSpecVersion(version.to_string()))?;

    let violations = check_schema(snapshot, schema_for(version));
    if !violations.is_empty() {
        return Err(ValidationError::InvalidPayload { violations });
    }

    match version {
        SpecVersion::V1 => Ok(()),
        SpecVersion::V03 => check_content_encoding(snapshot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("snapshot must be an object"),
        }
    }

    fn minimal(version: &str) -> Map<String, Value> {
        snapshot(json!({
            "specversion": version,
            "id": "1",
            "type": "t",
            "source": "/s",
        }))
    }

    #[test]
    fn test_minimal_envelopes_pass() {
        assert!(validate(&minimal("1.0"), "1.0").is_ok());
        assert!(validate(&minimal("0.3"), "0.3").is_ok());
    }

    #[test]
    fn test_unknown_version() {
        assert_eq!(
            validate(&minimal("2.0"), "2.0"),
            Err(ValidationError::InvalidSpecVersion("2.0".into()))
        );
    }

    #[test]
    fn test_declared_version_mismatch() {
        let err = validate(&minimal("0.3"), "1.0").unwrap_err();
        assert!(err.violations()[0].starts_with("specversion"));
    }

    #[test]
    fn test_collects_all_violations() {
        let snap = snapshot(json!({
            "specversion": "1.0",
            "id": "",
            "source": "not a uri",
            "time": "whenever",
        }));
        let violations = validate(&snap, "1.0").unwrap_err().violations();
        assert_eq!(violations.len(), 4);
        assert!(violations.contains(&"type: is required".to_string()));
        assert!(violations.contains(&"id: must not be empty".to_string()));
    }

    #[test]
    fn test_dataschema_must_be_absolute() {
        let mut snap = minimal("1.0");
        snap.insert("dataschema".into(), json!("/relative"));
        assert!(validate(&snap, "1.0").is_err());

        snap.insert("dataschema".into(), json!("https://example.com/schema"));
        assert!(validate(&snap, "1.0").is_ok());
    }

    #[test]
    fn test_schemaurl_reference_on_v03() {
        let mut snap = minimal("0.3");
        snap.insert("schemaurl".into(), json!("/schemas/order"));
        assert!(validate(&snap, "0.3").is_ok());
    }

    #[test]
    fn test_subject_non_empty() {
        let mut snap = minimal("1.0");
        snap.insert("subject".into(), json!(""));
        assert!(validate(&snap, "1.0").is_err());
    }

    #[test]
    fn test_permissive_time_formats() {
        let mut snap = minimal("1.0");
        snap.insert("time".into(), json!("Tue, 1 Jul 2003 10:52:37 +0200"));
        assert!(validate(&snap, "1.0").is_ok());
    }

    #[test]
    fn test_content_encoding_v03() {
        let mut snap = minimal("0.3");
        snap.insert("datacontentencoding".into(), json!("BASE64"));
        snap.insert("data".into(), json!("aGVsbG8="));
        assert!(validate(&snap, "0.3").is_ok());

        snap.insert("data".into(), json!("not base64!"));
        assert!(matches!(
            validate(&snap, "0.3"),
            Err(ValidationError::InvalidEncodedData(_))
        ));

        snap.insert("datacontentencoding".into(), json!("gzip"));
        assert_eq!(
            validate(&snap, "0.3"),
            Err(ValidationError::UnsupportedEncoding("gzip".into()))
        );
    }

    #[test]
    fn test_content_encoding_ignored_on_v1() {
        let mut snap = minimal("1.0");
        snap.insert("datacontentencoding".into(), json!("gzip"));
        assert!(validate(&snap, "1.0").is_ok());
    }
}
