//! # Subscription Filters
//!
//! Selects which envelopes a subscription receives, by event type and/or
//! source. Empty criteria match everything.

use ce_core::Event;
use serde::{Deserialize, Serialize};

/// Filter for subscribing to specific envelopes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    /// Event types to include. Empty means all types.
    pub types: Vec<String>,
    /// Sources to include. Empty means all sources.
    pub sources: Vec<String>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific event types.
    #[must_use]
    pub fn types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            sources: Vec::new(),
        }
    }

    /// Create a filter for events from specific sources.
    #[must_use]
    pub fn from_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: Vec::new(),
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        let type_match = self.types.is_empty()
            || event
                .event_type()
                .is_some_and(|t| self.types.iter().any(|wanted| wanted == t));
        let source_match = self.sources.is_empty()
            || event
                .source()
                .is_some_and(|s| self.sources.iter().any(|wanted| wanted == s));
        type_match && source_match
    }
}
