//! Pool configuration.

use super::errors::PoolError;
use super::health::HealthPolicy;
use super::topology::Topology;
use serde::{Deserialize, Serialize};

/// Agent pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Spawning beyond this fails with `PoolCapacity`.
    pub max_pool_size: usize,
    /// Byzantine agents the pool is expected to tolerate (`f`).
    pub max_faults: usize,
    pub health: HealthPolicy,
    pub topology: Topology,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pool_size: 64,
            max_faults: 1,
            health: HealthPolicy::default(),
            topology: Topology::Mesh,
        }
    }
}

impl PoolConfig {
    /// `3f + 1`.
    pub fn min_bft_size(&self) -> usize {
        3 * self.max_faults + 1
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_pool_size == 0 {
            return Err(PoolError::InvalidConfig(
                "max_pool_size must be positive".into(),
            ));
        }
        if self.health.eviction_threshold == 0 {
            return Err(PoolError::InvalidConfig(
                "eviction_threshold must be positive".into(),
            ));
        }
        if let Topology::Hierarchical { fanout: 0 } = self.topology {
            return Err(PoolError::InvalidConfig("fanout must be positive".into()));
        }
        Ok(())
    }
}
