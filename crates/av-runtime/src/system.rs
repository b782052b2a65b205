//! # Verification System
//!
//! The facade collaborators talk to. It owns one signature verification
//! service (and therefore one cache) shared by every pool, a registry of
//! live pools keyed by [`PoolHandle`], and one decision log all pools
//! write to.
//!
//! ```text
//!                    ┌──────────────────────────────┐
//!  verify_signature  │      VerificationSystem      │
//!  batch_verify ────▶│  SignatureVerificationService│──▶ SignatureCache
//!                    │                              │          ▲
//!  spawn_pool        │  pools: PoolHandle ─▶ entry  │          │
//!  destroy_pool ────▶│    ├─ AgentPool ─────────────│──────────┘
//!                    │    └─ ConsensusService ──────│──▶ InMemoryDecisionLog
//!  verify_with_      │                              │
//!  consensus ───────▶│                              │
//!                    └──────────────────────────────┘
//! ```
//!
//! The registry lock is only held to look up or mutate the map; rounds run
//! against a cloned `Arc` of the entry, so destroying a pool never waits on
//! (or cuts short) a round that is already in flight.

use crate::config::SystemConfig;
use crate::errors::SystemError;
use av_01_signature_verification::{
    BatchConfig, BatchResult, CacheConfig, CacheStats, SignatureVerificationApi,
    SignatureVerificationService, VerificationItem, VerificationOutcome,
};
use av_02_agent_pool::{AgentPool, AgentPoolApi, HealthSummary, PoolConfig, Proposition, Topology};
use av_03_consensus::{
    CancelHandle, ConsensusApi, ConsensusConfig, ConsensusResult, ConsensusService,
    InMemoryDecisionLog, ReputationSystem,
};
use parking_lot::RwLock;
use shared_types::{PoolHandle, SystemTimeSource, TimeSource, Verdict};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

struct PoolEntry {
    pool: Arc<AgentPool>,
    consensus: ConsensusService<InMemoryDecisionLog>,
}

/// Top-level handle over every subsystem.
pub struct VerificationSystem {
    config: SystemConfig,
    verification: SignatureVerificationService,
    decisions: Arc<InMemoryDecisionLog>,
    pools: RwLock<HashMap<PoolHandle, Arc<PoolEntry>>>,
    time_source: Arc<dyn TimeSource>,
}

impl VerificationSystem {
    /// Build with the given configuration and the system clock.
    pub fn new(config: SystemConfig) -> Result<Self, SystemError> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> VerificationSystemBuilder {
        VerificationSystemBuilder::default()
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // =========================================================================
    // DIRECT VERIFICATION
    // =========================================================================

    /// Single-shot verification. Bypasses the cache and consensus.
    pub fn verify_signature(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, SystemError> {
        Ok(self
            .verification
            .verify_signature(public_key, message, signature)?)
    }

    /// Cached verification.
    pub fn verify(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<VerificationOutcome, SystemError> {
        Ok(self.verification.verify(public_key, message, signature)?)
    }

    /// High-throughput path without consensus.
    pub fn batch_verify(&self, items: Vec<VerificationItem>) -> Result<BatchResult, SystemError> {
        Ok(self.verification.batch_verify(items)?)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.verification.cache_stats()
    }

    pub fn clear_cache(&self) {
        self.verification.clear_cache();
    }

    // =========================================================================
    // POOL LIFECYCLE
    // =========================================================================

    /// Create a pool of `size` agents wired to the shared cache.
    ///
    /// Agents start at the configured initial reputation weight. Capacity
    /// is checked before any agent is created.
    pub fn spawn_pool(&self, size: usize, topology: Topology) -> Result<PoolHandle, SystemError> {
        let pool_config = PoolConfig {
            topology,
            ..self.config.pool.clone()
        };
        let pool = Arc::new(AgentPool::new(pool_config, self.verification.manager())?);
        pool.spawn(size, self.config.consensus.reputation.initial_weight)?;

        let consensus = ConsensusService::with_time_source(
            pool.clone(),
            self.decisions.clone(),
            self.config.consensus.clone(),
            self.time_source.clone(),
        )?;

        let handle = PoolHandle::new();
        self.pools
            .write()
            .insert(handle, Arc::new(PoolEntry { pool, consensus }));
        info!(pool = %handle, size, ?topology, "pool spawned");
        Ok(handle)
    }

    /// Drop a pool. Rounds already running on it complete normally.
    pub fn destroy_pool(&self, handle: PoolHandle) -> Result<(), SystemError> {
        let entry = self
            .pools
            .write()
            .remove(&handle)
            .ok_or(SystemError::UnknownPool(handle))?;
        info!(pool = %handle, agents = entry.pool.len(), "pool destroyed");
        Ok(())
    }

    pub fn pool(&self, handle: PoolHandle) -> Result<Arc<AgentPool>, SystemError> {
        Ok(self.entry(handle)?.pool.clone())
    }

    pub fn pool_handles(&self) -> Vec<PoolHandle> {
        self.pools.read().keys().copied().collect()
    }

    /// Reputation table of one pool.
    pub fn reputation(&self, handle: PoolHandle) -> Result<Arc<ReputationSystem>, SystemError> {
        Ok(self.entry(handle)?.consensus.reputation().clone())
    }

    /// Probe every agent of a pool, evicting persistently failing ones.
    pub fn health_check(&self, handle: PoolHandle) -> Result<HealthSummary, SystemError> {
        let summary = self.entry(handle)?.pool.health_check_all();
        debug!(
            pool = %handle,
            healthy = summary.healthy,
            unreachable = summary.unreachable,
            evicted = summary.evicted.len(),
            "pool health checked"
        );
        Ok(summary)
    }

    /// Decisions of every terminal round, across all pools.
    pub fn decisions(&self) -> &Arc<InMemoryDecisionLog> {
        &self.decisions
    }

    // =========================================================================
    // CONSENSUS
    // =========================================================================

    /// Have a pool agree on whether `signature` is valid for
    /// `(public_key, message)`. Returns once the round is terminal.
    pub async fn verify_with_consensus(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
        handle: PoolHandle,
    ) -> Result<ConsensusResult, SystemError> {
        let entry = self.entry(handle)?;
        Ok(entry
            .consensus
            .verify_with_consensus(message, signature, public_key)
            .await?)
    }

    /// Agree on a caller-supplied verdict.
    pub async fn propose_and_vote(
        &self,
        value: Verdict,
        handle: PoolHandle,
    ) -> Result<ConsensusResult, SystemError> {
        let entry = self.entry(handle)?;
        Ok(entry.consensus.propose_and_vote(value).await?)
    }

    /// Run a round that the caller may abort through `cancel`.
    pub async fn run_consensus(
        &self,
        proposition: Proposition,
        cancel: CancelHandle,
        handle: PoolHandle,
    ) -> Result<ConsensusResult, SystemError> {
        let entry = self.entry(handle)?;
        Ok(entry.consensus.run(proposition, cancel).await?)
    }

    fn entry(&self, handle: PoolHandle) -> Result<Arc<PoolEntry>, SystemError> {
        self.pools
            .read()
            .get(&handle)
            .cloned()
            .ok_or(SystemError::UnknownPool(handle))
    }
}

impl std::fmt::Debug for VerificationSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationSystem")
            .field("pools", &self.pools.read().len())
            .field("decisions", &self.decisions.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builder for [`VerificationSystem`].
#[derive(Default)]
pub struct VerificationSystemBuilder {
    config: SystemConfig,
    time_source: Option<Arc<dyn TimeSource>>,
}

impl VerificationSystemBuilder {
    pub fn config(mut self, config: SystemConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = cache;
        self
    }

    pub fn batch(mut self, batch: BatchConfig) -> Self {
        self.config.batch = batch;
        self
    }

    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.config.pool = pool;
        self
    }

    pub fn consensus(mut self, consensus: ConsensusConfig) -> Self {
        self.config.consensus = consensus;
        self
    }

    /// Clock for cache expiry, reputation and decision timestamps.
    pub fn time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = Some(time_source);
        self
    }

    pub fn build(self) -> Result<VerificationSystem, SystemError> {
        self.config.validate()?;
        let time_source = self
            .time_source
            .unwrap_or_else(|| Arc::new(SystemTimeSource));
        let verification = SignatureVerificationService::with_clock(
            self.config.cache.clone(),
            self.config.batch.clone(),
            time_source.clone(),
        )?;
        info!(
            cache_entries = self.config.cache.max_entries,
            max_pool_size = self.config.pool.max_pool_size,
            "verification system ready"
        );
        Ok(VerificationSystem {
            config: self.config,
            verification,
            decisions: Arc::new(InMemoryDecisionLog::new()),
            pools: RwLock::new(HashMap::new()),
            time_source,
        })
    }
}
