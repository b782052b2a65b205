//! # Domain Entities
//!
//! Verification inputs, cached records and batch results.

use serde::{Deserialize, Serialize};
use shared_crypto::{CryptoError, Fingerprint};
use shared_types::Timestamp;
use std::time::Duration;

/// One `(public key, message, signature)` triple to verify.
///
/// Fields are raw bytes so malformed lengths can be reported per item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationItem {
    pub public_key: Vec<u8>,
    pub message: Vec<u8>,
    pub signature: Vec<u8>,
    /// Caller correlation id, echoed in the item result.
    pub id: Option<String>,
}

impl VerificationItem {
    pub fn new(
        public_key: impl Into<Vec<u8>>,
        message: impl Into<Vec<u8>>,
        signature: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            message: message.into(),
            signature: signature.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Cache entry. Immutable once written; re-verification replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureRecord {
    pub fingerprint: Fingerprint,
    pub valid: bool,
    pub verified_at: Timestamp,
}

/// Result of a cached verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub valid: bool,
    /// True when served from the cache.
    pub cached: bool,
    /// When the underlying verification ran.
    pub verified_at: Timestamp,
}

/// Cache hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// Per-item outcome within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResult {
    /// Position in the submitted batch.
    pub index: usize,
    pub id: Option<String>,
    pub valid: bool,
    /// Set when verification could not run for this item.
    pub error: Option<CryptoError>,
}

impl ItemResult {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregate outcome of a batch.
///
/// `invalid` counts every item that did not verify, including `failed`
/// items whose input was malformed.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub failed: usize,
    pub results: Vec<ItemResult>,
    pub verification_time: Duration,
    /// Items per second of wall-clock time.
    pub throughput: f64,
}

impl BatchResult {
    pub fn empty() -> Self {
        Self {
            total: 0,
            valid: 0,
            invalid: 0,
            failed: 0,
            results: Vec::new(),
            verification_time: Duration::ZERO,
            throughput: 0.0,
        }
    }

    pub(crate) fn from_results(results: Vec<ItemResult>, verification_time: Duration) -> Self {
        let total = results.len();
        let valid = results.iter().filter(|r| r.valid).count();
        let failed = results.iter().filter(|r| r.failed()).count();
        let secs = verification_time.as_secs_f64();
        let throughput = if secs > 0.0 { total as f64 / secs } else { 0.0 };
        Self {
            total,
            valid,
            invalid: total - valid,
            failed,
            results,
            verification_time,
            throughput,
        }
    }

    /// Fraction of items that verified.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.valid as f64 / self.total as f64
    }

    pub fn all_valid(&self) -> bool {
        self.valid == self.total
    }

    /// Items that did not verify, in submission order.
    pub fn invalid_items(&self) -> impl Iterator<Item = &ItemResult> {
        self.results.iter().filter(|r| !r.valid)
    }
}
