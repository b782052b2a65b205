//! # Verification Cache (Sharded LRU with Lazy TTL)
//!
//! Memoizes verification verdicts by fingerprint.
//!
//! ## Algorithm
//!
//! - Shard: first 8 bytes of the fingerprint pick one of N independently
//!   locked LRU maps, so concurrent verifications rarely contend.
//! - Read: an entry older than the TTL counts as a miss and is dropped.
//!   There is no background sweeper.
//! - Write: replaces the whole entry. Racing writers for one fingerprint
//!   store the same verdict since verification is deterministic.
//! - Bound: each shard holds `ceil(max_entries / shards)` entries and
//!   evicts least-recently-used on overflow.

use super::config::CacheConfig;
use super::entities::{CacheStats, SignatureRecord};
use super::errors::VerificationError;
use lru::LruCache;
use parking_lot::Mutex;
use shared_crypto::Fingerprint;
use shared_types::{SystemTimeSource, TimeSource};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Sharded, TTL-bounded verification cache.
pub struct SignatureCache {
    shards: Vec<Mutex<LruCache<Fingerprint, SignatureRecord>>>,
    ttl_ms: u64,
    hits: AtomicU64,
    misses: AtomicU64,
    clock: Arc<dyn TimeSource>,
}

impl SignatureCache {
    pub fn new(config: &CacheConfig) -> Result<Self, VerificationError> {
        Self::with_clock(config, Arc::new(SystemTimeSource))
    }

    pub fn with_clock(
        config: &CacheConfig,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, VerificationError> {
        config.validate()?;
        let per_shard = config.max_entries.div_ceil(config.shards);
        let cap = NonZeroUsize::new(per_shard).ok_or_else(|| {
            VerificationError::InvalidConfig("cache shard capacity is zero".into())
        })?;
        let shards = (0..config.shards)
            .map(|_| Mutex::new(LruCache::new(cap)))
            .collect();
        Ok(Self {
            shards,
            ttl_ms: config.ttl.as_millis() as u64,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            clock,
        })
    }

    fn shard(&self, fingerprint: &Fingerprint) -> &Mutex<LruCache<Fingerprint, SignatureRecord>> {
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&fingerprint[..8]);
        let index = (u64::from_le_bytes(prefix) % self.shards.len() as u64) as usize;
        &self.shards[index]
    }

    /// Current time according to the cache's clock.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Look up a live entry. Updates hit/miss counters.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<SignatureRecord> {
        let now = self.clock.now();
        let mut shard = self.shard(fingerprint).lock();

        let live = match shard.get(fingerprint) {
            Some(record) if now.saturating_sub(record.verified_at) < self.ttl_ms => Some(*record),
            Some(_) => {
                shard.pop(fingerprint);
                None
            }
            None => None,
        };
        drop(shard);

        match live {
            Some(record) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                crate::metrics::record_cache_hit();
                Some(record)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                crate::metrics::record_cache_miss();
                None
            }
        }
    }

    /// Store (or replace) an entry.
    pub fn insert(&self, record: SignatureRecord) {
        self.shard(&record.fingerprint)
            .lock()
            .put(record.fingerprint, record);
    }

    /// Entries currently held, including any not yet lazily expired.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().clear();
        }
    }

    pub fn reset_stats(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStats {
            size: self.len(),
            hits,
            misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
        }
    }
}
