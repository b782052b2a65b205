//! # Agentic Verification Test Suite
//!
//! Cross-crate scenarios driven through the `VerificationSystem` facade.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── verification.rs   # cache, batch isolation, crypto properties
//! │   ├── consensus.rs      # quorum, Byzantine agents, view changes
//! │   └── lifecycle.rs      # pool spawn/destroy, health, cancellation
//! └── benches/              # criterion throughput benches
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p av-tests
//! cargo test -p av-tests integration::consensus::
//! cargo bench -p av-tests
//! ```

pub mod integration;
