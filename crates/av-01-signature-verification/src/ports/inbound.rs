//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use crate::domain::entities::{BatchResult, CacheStats, VerificationItem, VerificationOutcome};
use crate::domain::errors::VerificationError;

/// Primary Signature Verification API.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait SignatureVerificationApi: Send + Sync {
    // =========================================================================
    // Single Verification
    // =========================================================================

    /// Direct verification, bypassing the cache.
    ///
    /// `Ok(false)` for a signature that does not verify; `Err` only for
    /// malformed lengths.
    fn verify_signature(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, VerificationError>;

    /// Cached verification.
    fn verify(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<VerificationOutcome, VerificationError>;

    /// Cached verification of each item, preserving order.
    fn verify_many(
        &self,
        items: &[VerificationItem],
    ) -> Vec<Result<VerificationOutcome, VerificationError>>;

    // =========================================================================
    // Batch Verification
    // =========================================================================

    /// Parallel verification with the configured concurrency.
    ///
    /// # Performance
    /// Uses a bounded rayon pool; oversized batches are chunked.
    fn batch_verify(&self, items: Vec<VerificationItem>) -> Result<BatchResult, VerificationError>;

    // =========================================================================
    // Cache Management
    // =========================================================================

    fn cache_stats(&self) -> CacheStats;

    fn clear_cache(&self);
}
