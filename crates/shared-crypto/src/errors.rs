//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The system RNG could not supply entropy
    #[error("Entropy unavailable: {0}")]
    EntropyUnavailable(String),

    /// The identity's private key has been zeroized
    #[error("Private key material has been destroyed")]
    KeyDestroyed,

    /// Invalid public key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Invalid signature length
    #[error("Invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength {
        /// Expected signature length in bytes
        expected: usize,
        /// Actual signature length in bytes
        actual: usize,
    },

    /// Seed is neither 32 nor 64 bytes
    #[error("Invalid seed length: expected 32 or 64, got {0}")]
    InvalidSeedLength(usize),

    /// Public half of a 64-byte seed does not match the derived key
    #[error("Seed public key does not match derived key")]
    SeedKeyMismatch,

    /// Public key bytes are not a valid curve point
    #[error("Invalid public key")]
    InvalidPublicKey,
}

impl CryptoError {
    /// Malformed caller input, rejected before any cryptography runs.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CryptoError::InvalidKeyLength { .. }
                | CryptoError::InvalidSignatureLength { .. }
                | CryptoError::InvalidSeedLength(_)
                | CryptoError::SeedKeyMismatch
                | CryptoError::InvalidPublicKey
        )
    }
}
