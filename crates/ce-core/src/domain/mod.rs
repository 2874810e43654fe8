//! Domain Layer - the envelope itself
//!
//! This layer contains:
//! - The immutable `Event` value object and its builder
//! - The property bag used to construct events
//! - Per-version schema validation
//! - Timestamp and URI syntax helpers
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod event;
pub mod property;
pub mod time;
pub mod uri;
pub mod validation;
pub mod version;

pub use event::{Data, Event, EventBuilder};
pub use property::{
    extension_kind, is_valid_extension_name, Attribute, ExtensionKind, Property, PropertyBag,
    PropertyValue,
};
pub use validation::validate;
pub use version::{Mode, SpecVersion};
