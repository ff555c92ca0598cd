//! Store configuration
//!
//! The only tunable is the cleanup interval. A zero interval (the default)
//! disables automatic expiry entirely.

use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

/// Store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum age of an entry, and period of the expiry sweep.
    /// Zero keeps entries until they are deleted explicitly.
    #[serde(rename = "cleanup_interval_ms", with = "millis")]
    pub cleanup_interval: Duration,
}

impl StoreConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cleanup interval
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Whether a background sweep should run for this configuration
    pub fn cleanup_enabled(&self) -> bool {
        !self.cleanup_interval.is_zero()
    }

    /// Parse a configuration from a JSON document
    ///
    /// Missing fields keep their defaults, so `{}` yields a store without
    /// automatic expiry.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid store configuration")
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
