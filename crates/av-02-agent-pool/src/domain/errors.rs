//! Agent pool error types.

use shared_crypto::CryptoError;
use shared_types::AgentId;
use thiserror::Error;

/// Errors from pool membership operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PoolError {
    /// Spawning would exceed the configured maximum pool size
    #[error("Pool capacity exceeded: {current} agents + {requested} requested > {max}")]
    PoolCapacity {
        requested: usize,
        current: usize,
        max: usize,
    },

    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    /// Weight must be finite and non-negative
    #[error("Invalid agent weight: {0}")]
    InvalidWeight(f64),

    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
