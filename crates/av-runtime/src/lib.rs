//! # Agentic Verification Runtime
//!
//! Wires the subsystems into a single [`VerificationSystem`]:
//!
//! - `av-01-signature-verification`: cached single and batch verification
//! - `av-02-agent-pool`: verifier agents, health, topology
//! - `av-03-consensus`: PBFT rounds, voting, reputation
//! - `av-telemetry`: logging setup for the binary
//!
//! ## Example
//!
//! ```no_run
//! use av_runtime::{SystemConfig, VerificationSystem};
//! use av_02_agent_pool::Topology;
//!
//! # async fn demo(pk: &[u8], msg: &[u8], sig: &[u8]) -> Result<(), av_runtime::SystemError> {
//! let system = VerificationSystem::new(SystemConfig::from_env())?;
//! let pool = system.spawn_pool(4, Topology::Mesh)?;
//! let result = system.verify_with_consensus(msg, sig, pk, pool).await?;
//! println!("committed={} verified={}", result.is_committed(), result.verified);
//! system.destroy_pool(pool)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod system;

pub use config::SystemConfig;
pub use errors::SystemError;
pub use system::{VerificationSystem, VerificationSystemBuilder};
