//! Cache configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn default_record_stats() -> bool {
    true
}

/// Settings used to build an [`LruCache`](crate::LruCache)
///
/// # Example
/// ```
/// use lrucache::CacheConfig;
///
/// let config = CacheConfig::from_json(r#"{ "capacity": 128 }"#).unwrap();
/// assert_eq!(config.capacity, 128);
/// assert!(config.record_stats);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries; must be greater than 0
    pub capacity: usize,

    /// Track hit/miss/eviction counters
    #[serde(default = "default_record_stats")]
    pub record_stats: bool,
}

impl CacheConfig {
    /// Config for `capacity` entries with statistics enabled
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            record_stats: true,
        }
    }

    /// Enable or disable statistics
    pub fn with_stats(mut self, record_stats: bool) -> Self {
        self.record_stats = record_stats;
        self
    }

    /// Parse and validate a JSON config document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CacheConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no cache can be built from
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfiguration(
                "capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
