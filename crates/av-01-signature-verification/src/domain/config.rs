//! Cache and batch tunables.

use super::errors::VerificationError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default cache time-to-live.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default chunk size for batch verification.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Verification cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Upper bound on cached entries across all shards.
    pub max_entries: usize,
    /// Entries older than this are re-verified on lookup.
    pub ttl: Duration,
    /// Number of independently locked shards.
    pub shards: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: DEFAULT_CACHE_TTL,
            shards: 16,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), VerificationError> {
        if self.max_entries == 0 {
            return Err(VerificationError::InvalidConfig(
                "cache max_entries must be positive".into(),
            ));
        }
        if self.shards == 0 || self.shards > self.max_entries {
            return Err(VerificationError::InvalidConfig(format!(
                "cache shards must be in 1..={}",
                self.max_entries
            )));
        }
        Ok(())
    }
}

/// Batch verifier configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Items per chunk; chunks are processed one after another.
    pub max_batch_size: usize,
    /// Worker threads used within a chunk.
    pub max_concurrency: usize,
    /// Hard limit on a single request.
    pub max_items: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            max_items: 1_000_000,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), VerificationError> {
        if self.max_batch_size == 0 {
            return Err(VerificationError::InvalidConfig(
                "max_batch_size must be positive".into(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(VerificationError::InvalidConfig(
                "max_concurrency must be positive".into(),
            ));
        }
        if self.max_items < self.max_batch_size {
            return Err(VerificationError::InvalidConfig(
                "max_items must be at least max_batch_size".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(CacheConfig::default().validate().is_ok());
        assert!(BatchConfig::default().validate().is_ok());
        assert_eq!(CacheConfig::default().ttl, Duration::from_secs(300));
        assert_eq!(BatchConfig::default().max_batch_size, 1000);
    }

    #[test]
    fn test_zero_values_rejected() {
        let cache = CacheConfig {
            max_entries: 0,
            ..CacheConfig::default()
        };
        assert!(cache.validate().is_err());

        let batch = BatchConfig {
            max_concurrency: 0,
            ..BatchConfig::default()
        };
        assert!(batch.validate().is_err());
    }
}
