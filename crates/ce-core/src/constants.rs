//! Wire-level names shared by the codecs.

/// Generic content-type header (never prefixed).
pub const HEADER_CONTENT_TYPE: &str = "content-type";

/// Prefix carried by every envelope header in binary mode.
pub const EXTENSIONS_PREFIX: &str = "ce-";

/// The only supported content encoding (0.3).
pub const ENCODING_BASE64: &str = "base64";

/// Name of the payload attribute.
pub const DATA_ATTRIBUTE: &str = "data";

/// Name of the base64 payload marker (1.0).
pub const DATA_BASE64_ATTRIBUTE: &str = "data_base64";

/// MIME types recognized by the parser registry.
pub mod mime {
    pub const JSON: &str = "application/json";
    pub const OCTET_STREAM: &str = "application/octet-stream";
    /// Prefix identifying a complete envelope document.
    pub const CE: &str = "application/cloudevents";
    pub const CE_JSON: &str = "application/cloudevents+json";

    /// Default content type for binary-mode bodies.
    pub const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";
    /// Content type of structured-mode bodies.
    pub const DEFAULT_CE_CONTENT_TYPE: &str = "application/cloudevents+json; charset=utf-8";
}

/// Binary-mode header names.
pub mod headers {
    pub const ID: &str = "ce-id";
    pub const TYPE: &str = "ce-type";
    pub const SOURCE: &str = "ce-source";
    pub const SPEC_VERSION: &str = "ce-specversion";
    pub const TIME: &str = "ce-time";
    pub const SUBJECT: &str = "ce-subject";

    /// 1.0 only.
    pub const DATA_SCHEMA: &str = "ce-dataschema";

    /// 0.3 only.
    pub const SCHEMA_URL: &str = "ce-schemaurl";
    /// 0.3 only.
    pub const CONTENT_ENCODING: &str = "ce-datacontentencoding";
}
