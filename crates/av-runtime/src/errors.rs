//! Facade error type.

use av_01_signature_verification::VerificationError;
use av_02_agent_pool::PoolError;
use av_03_consensus::ConsensusError;
use av_telemetry::TelemetryError;
use shared_types::PoolHandle;
use thiserror::Error;

/// Errors surfaced by [`VerificationSystem`](crate::VerificationSystem).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SystemError {
    /// Handle never issued, or the pool was destroyed
    #[error("Unknown pool: {0}")]
    UnknownPool(PoolHandle),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

impl SystemError {
    /// Malformed caller input (key or signature lengths), never retried.
    pub fn is_input_error(&self) -> bool {
        match self {
            SystemError::Verification(e) => e.is_input_error(),
            SystemError::Consensus(ConsensusError::Crypto(e)) => e.is_input_error(),
            _ => false,
        }
    }
}
