//! # Verification Errors
//!
//! A signature that fails to verify is not an error; it is `valid: false`.
//! Errors here are malformed input, oversized batches and configuration
//! problems.

use shared_crypto::CryptoError;
use thiserror::Error;

/// Errors that can occur during signature verification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// Malformed key or signature, or an unusable identity
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Batch exceeds the hard item limit; rejected before any work
    #[error("Batch of {size} items exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Configuration values out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Worker pool could not be built
    #[error("Worker pool unavailable: {0}")]
    WorkerPool(String),
}

impl VerificationError {
    /// Whether the caller supplied malformed input.
    pub fn is_input_error(&self) -> bool {
        match self {
            VerificationError::Crypto(e) => e.is_input_error(),
            _ => false,
        }
    }
}
