//! # Signature Verification Subsystem (AV-01)
//!
//! Cached and batched Ed25519 verification. Every agent in a pool verifies
//! through the same [`SignatureManager`], so repeated verdicts on one
//! `(public key, message, signature)` triple are computed once per TTL.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): cache, manager, batch verifier; no I/O
//! - **Ports Layer** (`ports/`): inbound API trait
//! - **Service Layer** (`service.rs`): wires domain logic to ports
//!
//! ## Semantics
//!
//! - A signature that does not verify is `valid: false`, never an error.
//! - Wrong-length keys or signatures are input errors and are not cached.
//! - Cache expiry is lazy; there is no background task.

pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::batch::BatchVerifier;
pub use domain::cache::SignatureCache;
pub use domain::config::{BatchConfig, CacheConfig, DEFAULT_CACHE_TTL, DEFAULT_MAX_BATCH_SIZE};
pub use domain::entities::{
    BatchResult, CacheStats, ItemResult, SignatureRecord, VerificationItem, VerificationOutcome,
};
pub use domain::errors::VerificationError;
pub use domain::manager::SignatureManager;
pub use ports::inbound::SignatureVerificationApi;
pub use service::SignatureVerificationService;
