//! Envelope versions and wire modes.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported envelope format versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpecVersion {
    /// Version 1.0 (default).
    #[default]
    #[serde(rename = "1.0")]
    V1,
    /// Version 0.3.
    #[serde(rename = "0.3")]
    V03,
}

impl SpecVersion {
    /// The version string as it appears on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SpecVersion::V1 => "1.0",
            SpecVersion::V03 => "0.3",
        }
    }

    /// Parse a wire value, returning `None` for anything unrecognized.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "1.0" => Some(SpecVersion::V1),
            "0.3" => Some(SpecVersion::V03),
            _ => None,
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecVersion {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ValidationError::InvalidSpecVersion(s.to_string()))
    }
}

/// The two wire shapes of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Attributes as headers, payload as body.
    Binary,
    /// Whole envelope serialized as the body.
    Structured,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Binary => f.write_str("binary"),
            Mode::Structured => f.write_str("structured"),
        }
    }
}
