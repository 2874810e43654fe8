//! Bus configuration.

use crate::DEFAULT_CHANNEL_CAPACITY;
use serde::{Deserialize, Serialize};

/// Configuration for [`InMemoryEventBus`](crate::InMemoryEventBus).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Events buffered per subscriber before the slowest one lags.
    pub capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl BusConfig {
    #[must_use]
    pub fn builder() -> BusConfigBuilder {
        BusConfigBuilder::new()
    }
}

/// Builder for [`BusConfig`].
#[derive(Debug, Default)]
pub struct BusConfigBuilder {
    capacity: Option<usize>,
}

impl BusConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-subscriber channel capacity (minimum 1).
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn build(self) -> BusConfig {
        let defaults = BusConfig::default();
        BusConfig {
            capacity: self.capacity.unwrap_or(defaults.capacity).max(1),
        }
    }
}
