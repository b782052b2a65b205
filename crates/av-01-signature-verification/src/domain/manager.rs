//! # Signature Manager
//!
//! Signature Engine fronted by the verification cache.

use super::cache::SignatureCache;
use super::entities::{SignatureRecord, VerificationItem, VerificationOutcome};
use super::errors::VerificationError;
use shared_crypto::{fingerprint, CryptoError, SignatureEngine, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use std::sync::Arc;
use tracing::trace;

/// Cached verifier shared by every agent of a pool.
pub struct SignatureManager {
    engine: SignatureEngine,
    cache: Arc<SignatureCache>,
}

impl SignatureManager {
    pub fn new(cache: Arc<SignatureCache>) -> Self {
        Self {
            engine: SignatureEngine::new(),
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<SignatureCache> {
        &self.cache
    }

    pub fn engine(&self) -> &SignatureEngine {
        &self.engine
    }

    /// Verify through the cache.
    ///
    /// Malformed lengths are rejected before the cache is consulted, so
    /// they never occupy an entry.
    pub fn verify(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<VerificationOutcome, VerificationError> {
        check_lengths(public_key, signature)?;
        let fp = fingerprint(public_key, message, signature);

        if let Some(record) = self.cache.lookup(&fp) {
            trace!(valid = record.valid, "verification served from cache");
            return Ok(VerificationOutcome {
                valid: record.valid,
                cached: true,
                verified_at: record.verified_at,
            });
        }

        let valid = self.engine.verify(public_key, message, signature)?;
        let verified_at = self.cache.now();
        self.cache.insert(SignatureRecord {
            fingerprint: fp,
            valid,
            verified_at,
        });

        Ok(VerificationOutcome {
            valid,
            cached: false,
            verified_at,
        })
    }

    /// Verify each item in order. One item's error does not affect the others.
    pub fn verify_many(
        &self,
        items: &[VerificationItem],
    ) -> Vec<Result<VerificationOutcome, VerificationError>> {
        items
            .iter()
            .map(|item| self.verify(&item.public_key, &item.message, &item.signature))
            .collect()
    }
}

fn check_lengths(public_key: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
    if public_key.len() != PUBLIC_KEY_LENGTH {
        return Err(CryptoError::InvalidKeyLength {
            expected: PUBLIC_KEY_LENGTH,
            actual: public_key.len(),
        });
    }
    if signature.len() != SIGNATURE_LENGTH {
        return Err(CryptoError::InvalidSignatureLength {
            expected: SIGNATURE_LENGTH,
            actual: signature.len(),
        });
    }
    Ok(())
}
