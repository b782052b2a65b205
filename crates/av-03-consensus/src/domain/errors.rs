//! Error types for the consensus subsystem.
//!
//! Liveness failures, insufficient participation and cancellation are
//! reported through [`ConsensusStatus`](super::ConsensusStatus), not here.

use av_02_agent_pool::PoolError;
use shared_crypto::CryptoError;

/// Consensus error types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsensusError {
    /// A round was requested against a pool with no agents
    #[error("Agent pool is empty")]
    EmptyPool,

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Invalid consensus configuration: {0}")]
    InvalidConfig(String),

    /// Malformed key or signature handed to `verify_with_consensus`
    #[error("Invalid input: {0}")]
    Crypto(#[from] CryptoError),
}
