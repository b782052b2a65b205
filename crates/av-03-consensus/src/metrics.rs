//! # Consensus Metrics
//!
//! Prometheus metrics for monitoring consensus rounds.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! av-03-consensus = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `consensus_rounds_total` - Counter of finished rounds (by status)
//! - `consensus_view_changes_total` - Counter of view changes (by reason)
//! - `consensus_byzantine_detections_total` - Counter of flagged agents
//! - `consensus_round_latency_seconds` - Histogram of round durations

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Finished rounds, labeled by terminal status
    pub static ref ROUNDS: IntCounterVec = register_int_counter_vec!(
        "consensus_rounds_total",
        "Total number of finished consensus rounds",
        &["status"]
    )
    .expect("Failed to create ROUNDS metric");

    /// View changes, labeled by reason
    pub static ref VIEW_CHANGES: IntCounterVec = register_int_counter_vec!(
        "consensus_view_changes_total",
        "Total number of view changes",
        &["reason"]
    )
    .expect("Failed to create VIEW_CHANGES metric");

    pub static ref BYZANTINE_DETECTIONS: IntCounter = register_int_counter!(
        "consensus_byzantine_detections_total",
        "Total number of agents flagged Byzantine"
    )
    .expect("Failed to create BYZANTINE_DETECTIONS metric");

    /// Histogram of round latency
    pub static ref ROUND_LATENCY: Histogram = register_histogram!(
        "consensus_round_latency_seconds",
        "Time taken to finish a consensus round in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to create ROUND_LATENCY metric");
}

/// Record a finished round
#[cfg(feature = "metrics")]
pub fn record_round(status: &str, seconds: f64, byzantine: usize) {
    ROUNDS.with_label_values(&[status]).inc();
    ROUND_LATENCY.observe(seconds);
    BYZANTINE_DETECTIONS.inc_by(byzantine as u64);
}

/// Record a view change with reason
#[cfg(feature = "metrics")]
pub fn record_view_change(reason: &str) {
    VIEW_CHANGES.with_label_values(&[reason]).inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_round(_status: &str, _seconds: f64, _byzantine: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_view_change(_reason: &str) {}
