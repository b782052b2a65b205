//! # Batch Verifier
//!
//! Parallel verification of independent items with bounded concurrency.
//!
//! ## Algorithm
//!
//! 1. Reject requests above `max_items` before any work.
//! 2. Split into chunks of at most `max_batch_size`.
//! 3. Process chunks sequentially. Each chunk is cut into at most `workers`
//!    slices run on one rayon pool of `BatchConfig::max_concurrency` threads,
//!    built once. `workers` is the requested concurrency clamped to the pool
//!    size and the chunk length.
//! 4. An item whose input is malformed is marked failed; the rest of the
//!    chunk is unaffected.

use super::config::BatchConfig;
use super::entities::{BatchResult, ItemResult, VerificationItem};
use super::errors::VerificationError;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use shared_crypto::SignatureEngine;
use std::time::Instant;
use tracing::debug;

/// Batch verifier over a single fixed-size worker pool.
pub struct BatchVerifier {
    engine: SignatureEngine,
    config: BatchConfig,
    pool: ThreadPool,
}

impl BatchVerifier {
    pub fn new(config: BatchConfig) -> Result<Self, VerificationError> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.max_concurrency)
            .thread_name(|i| format!("av-verify-{i}"))
            .build()
            .map_err(|e| VerificationError::WorkerPool(e.to_string()))?;
        Ok(Self {
            engine: SignatureEngine::new(),
            config,
            pool,
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn max_batch_size(&self) -> usize {
        self.config.max_batch_size
    }

    /// Threads owned by the worker pool. Fixed for the verifier's lifetime.
    pub fn pool_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Workers a request for `requested` may use on `len` items.
    pub fn effective_workers(&self, requested: usize, len: usize) -> usize {
        requested.min(self.config.max_concurrency).min(len).max(1)
    }

    /// Verify `items` with at most `max_concurrency` workers.
    ///
    /// Requests above the configured concurrency are clamped to it.
    pub fn verify_batch(
        &self,
        items: Vec<VerificationItem>,
        max_concurrency: usize,
    ) -> Result<BatchResult, VerificationError> {
        if items.len() > self.config.max_items {
            return Err(VerificationError::BatchTooLarge {
                size: items.len(),
                max: self.config.max_items,
            });
        }
        if max_concurrency == 0 {
            return Err(VerificationError::InvalidConfig(
                "max_concurrency must be positive".into(),
            ));
        }
        if items.is_empty() {
            return Ok(BatchResult::empty());
        }

        let chunk_size = self.config.max_batch_size;
        let start = Instant::now();
        let mut results = Vec::with_capacity(items.len());

        for (chunk_index, chunk) in items.chunks(chunk_size).enumerate() {
            let offset = chunk_index * chunk_size;
            let workers = self.effective_workers(max_concurrency, chunk.len());
            let slice_len = chunk.len().div_ceil(workers);
            let slices: Vec<Vec<ItemResult>> = self.pool.install(|| {
                chunk
                    .par_chunks(slice_len)
                    .enumerate()
                    .map(|(slice, part)| {
                        let base = offset + slice * slice_len;
                        part.iter()
                            .enumerate()
                            .map(|(i, item)| self.verify_item(base + i, item))
                            .collect()
                    })
                    .collect()
            });
            results.extend(slices.into_iter().flatten());
        }

        let result = BatchResult::from_results(results, start.elapsed());
        debug!(
            total = result.total,
            valid = result.valid,
            failed = result.failed,
            throughput = result.throughput,
            "batch verified"
        );
        crate::metrics::record_batch(result.total, result.throughput);
        Ok(result)
    }

    /// Verify with the configured concurrency, re-chunking as needed.
    pub fn verify_large_batch(
        &self,
        items: Vec<VerificationItem>,
    ) -> Result<BatchResult, VerificationError> {
        self.verify_batch(items, self.config.max_concurrency)
    }

    fn verify_item(&self, index: usize, item: &VerificationItem) -> ItemResult {
        match self
            .engine
            .verify(&item.public_key, &item.message, &item.signature)
        {
            Ok(valid) => ItemResult {
                index,
                id: item.id.clone(),
                valid,
                error: None,
            },
            Err(e) => ItemResult {
                index,
                id: item.id.clone(),
                valid: false,
                error: Some(e),
            },
        }
    }
}
