//! # Verification Metrics
//!
//! Prometheus metrics for the cache and batch verifier.
//!
//! Enable with the `metrics` feature:
//! ```toml
//! av-01-signature-verification = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `av_verification_cache_hits_total`
//! - `av_verification_cache_misses_total`
//! - `av_verification_batch_items_total`
//! - `av_verification_batch_throughput` - items/second of the last batch

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_gauge, register_int_counter, Gauge, IntCounter};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref CACHE_HITS: IntCounter = register_int_counter!(
        "av_verification_cache_hits_total",
        "Verifications served from the cache"
    )
    .expect("Failed to create CACHE_HITS metric");

    pub static ref CACHE_MISSES: IntCounter = register_int_counter!(
        "av_verification_cache_misses_total",
        "Verifications that missed the cache"
    )
    .expect("Failed to create CACHE_MISSES metric");

    pub static ref BATCH_ITEMS: IntCounter = register_int_counter!(
        "av_verification_batch_items_total",
        "Items processed by the batch verifier"
    )
    .expect("Failed to create BATCH_ITEMS metric");

    pub static ref BATCH_THROUGHPUT: Gauge = register_gauge!(
        "av_verification_batch_throughput",
        "Items per second of the most recent batch"
    )
    .expect("Failed to create BATCH_THROUGHPUT metric");
}

#[cfg(feature = "metrics")]
pub fn record_cache_hit() {
    CACHE_HITS.inc();
}

#[cfg(feature = "metrics")]
pub fn record_cache_miss() {
    CACHE_MISSES.inc();
}

#[cfg(feature = "metrics")]
pub fn record_batch(items: usize, throughput: f64) {
    BATCH_ITEMS.inc_by(items as u64);
    BATCH_THROUGHPUT.set(throughput);
}

// No-op implementations when metrics feature is disabled

#[cfg(not(feature = "metrics"))]
pub fn record_cache_hit() {}

#[cfg(not(feature = "metrics"))]
pub fn record_cache_miss() {}

#[cfg(not(feature = "metrics"))]
pub fn record_batch(_items: usize, _throughput: f64) {}
