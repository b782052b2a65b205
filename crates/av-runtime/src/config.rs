//! # System Configuration
//!
//! Unified configuration for every subsystem. All values have defaults and
//! can be overridden from `AV_*` environment variables; unparsable values
//! keep the default.

use crate::errors::SystemError;
use av_01_signature_verification::{BatchConfig, CacheConfig};
use av_02_agent_pool::PoolConfig;
use av_03_consensus::ConsensusConfig;
use av_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Complete system configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub cache: CacheConfig,
    pub batch: BatchConfig,
    /// Template for every pool; `spawn_pool` overrides the topology.
    pub pool: PoolConfig,
    pub consensus: ConsensusConfig,
    pub telemetry: TelemetryConfig,
}

impl SystemConfig {
    /// Load from environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `AV_CACHE_TTL_SECS` | `cache.ttl` |
    /// | `AV_CACHE_MAX_ENTRIES` | `cache.max_entries` |
    /// | `AV_MAX_BATCH_SIZE` | `batch.max_batch_size` |
    /// | `AV_MAX_POOL_SIZE` | `pool.max_pool_size` |
    /// | `AV_PRE_PREPARE_TIMEOUT_MS` | `consensus.pre_prepare_timeout` |
    /// | `AV_PHASE_TIMEOUT_MS` | `consensus.phase_timeout` |
    /// | `AV_MAX_VIEW_CHANGES` | `consensus.max_view_changes` |
    /// | `AV_LOG_LEVEL`, `AV_JSON_LOGS` | `telemetry` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self {
            telemetry: TelemetryConfig::from_lookup(&lookup),
            ..Self::default()
        };

        if let Some(secs) = parse::<u64>(&lookup, "AV_CACHE_TTL_SECS") {
            config.cache.ttl = Duration::from_secs(secs);
        }
        if let Some(n) = parse(&lookup, "AV_CACHE_MAX_ENTRIES") {
            config.cache.max_entries = n;
        }
        if let Some(n) = parse(&lookup, "AV_MAX_BATCH_SIZE") {
            config.batch.max_batch_size = n;
        }
        if let Some(n) = parse(&lookup, "AV_MAX_POOL_SIZE") {
            config.pool.max_pool_size = n;
        }
        if let Some(ms) = parse::<u64>(&lookup, "AV_PRE_PREPARE_TIMEOUT_MS") {
            config.consensus.pre_prepare_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64>(&lookup, "AV_PHASE_TIMEOUT_MS") {
            config.consensus.phase_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = parse(&lookup, "AV_MAX_VIEW_CHANGES") {
            config.consensus.max_view_changes = n;
        }
        config
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), SystemError> {
        self.cache.validate()?;
        self.batch.validate()?;
        self.pool.validate()?;
        self.consensus.validate()?;
        if self.consensus.reputation.initial_weight < self.consensus.reputation.min_weight
            || self.consensus.reputation.initial_weight > self.consensus.reputation.max_weight
        {
            return Err(SystemError::Config(
                "initial agent weight must lie within the reputation bounds".into(),
            ));
        }
        Ok(())
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}
