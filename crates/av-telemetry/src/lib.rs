//! # AV Telemetry
//!
//! Observability setup for the agentic verification core.
//!
//! ## Components
//!
//! - **Tracing**: `tracing-subscriber` registry with `EnvFilter`, JSON or
//!   human-readable output
//! - **Metrics**: Prometheus text export of the default registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use av_telemetry::{init_tracing, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_tracing(&config).expect("Failed to init tracing");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AV_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `AV_JSON_LOGS` | `false` | JSON formatted output |
//! | `AV_SERVICE_NAME` | `agentic-verification` | Service name in events |

mod config;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::encode_metrics;
pub use tracing_setup::{build_filter, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// A global subscriber is already installed
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Failed to encode metrics: {0}")]
    Metrics(String),
}
