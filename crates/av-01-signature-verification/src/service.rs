//! # Signature Verification Service
//!
//! Application service layer that implements the `SignatureVerificationApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`SignatureVerificationApi`)
//! - Owns the shared cache through a [`SignatureManager`]
//! - Delegates batch work to the [`BatchVerifier`]

use crate::domain::batch::BatchVerifier;
use crate::domain::cache::SignatureCache;
use crate::domain::config::{BatchConfig, CacheConfig};
use crate::domain::entities::{BatchResult, CacheStats, VerificationItem, VerificationOutcome};
use crate::domain::errors::VerificationError;
use crate::domain::manager::SignatureManager;
use crate::ports::inbound::SignatureVerificationApi;
use shared_types::TimeSource;
use std::sync::Arc;

/// Signature Verification Service.
pub struct SignatureVerificationService {
    manager: Arc<SignatureManager>,
    batch: BatchVerifier,
}

impl SignatureVerificationService {
    pub fn new(cache: CacheConfig, batch: BatchConfig) -> Result<Self, VerificationError> {
        let cache = SignatureCache::new(&cache)?;
        Ok(Self {
            manager: Arc::new(SignatureManager::new(Arc::new(cache))),
            batch: BatchVerifier::new(batch)?,
        })
    }

    /// Build with an injected clock for the cache.
    pub fn with_clock(
        cache: CacheConfig,
        batch: BatchConfig,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, VerificationError> {
        let cache = SignatureCache::with_clock(&cache, clock)?;
        Ok(Self {
            manager: Arc::new(SignatureManager::new(Arc::new(cache))),
            batch: BatchVerifier::new(batch)?,
        })
    }

    /// Default cache and batch settings.
    pub fn with_defaults() -> Result<Self, VerificationError> {
        Self::new(CacheConfig::default(), BatchConfig::default())
    }

    /// Cached verifier, shared with agents so every pool member hits one cache.
    pub fn manager(&self) -> Arc<SignatureManager> {
        self.manager.clone()
    }

    pub fn batch_verifier(&self) -> &BatchVerifier {
        &self.batch
    }
}

impl SignatureVerificationApi for SignatureVerificationService {
    fn verify_signature(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, VerificationError> {
        Ok(self.manager.engine().verify(public_key, message, signature)?)
    }

    fn verify(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<VerificationOutcome, VerificationError> {
        self.manager.verify(public_key, message, signature)
    }

    fn verify_many(
        &self,
        items: &[VerificationItem],
    ) -> Vec<Result<VerificationOutcome, VerificationError>> {
        self.manager.verify_many(items)
    }

    fn batch_verify(&self, items: Vec<VerificationItem>) -> Result<BatchResult, VerificationError> {
        self.batch.verify_large_batch(items)
    }

    fn cache_stats(&self) -> CacheStats {
        self.manager.cache().stats()
    }

    fn clear_cache(&self) {
        self.manager.cache().clear();
    }
}
