//! # Agent Pool Subsystem (AV-02)
//!
//! Manages verifier agents: each wraps an Ed25519 identity, verifies through
//! the shared cache, and carries a health state and a fault behaviour.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): agent, health state machine, topology
//! - **Ports Layer** (`ports/`): `AgentPoolApi`
//! - **Service Layer** (`service.rs`): `AgentPool`, the owner of all agents
//!
//! ## Ownership
//!
//! The pool exclusively owns its agents. Consensus rounds take a snapshot of
//! `participants()` at round start, so a later `remove` never pulls an agent
//! out of a round already in flight.
//!
//! ## BFT Sizing
//!
//! A pool smaller than `3f + 1` is allowed but reports `is_bft_safe() ==
//! false`; callers should trust its results less.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::agent::{Agent, AgentStats, LocalVerdict, Proposition};
pub use domain::behavior::AgentBehavior;
pub use domain::config::PoolConfig;
pub use domain::errors::PoolError;
pub use domain::health::{HealthPolicy, HealthStatus, HealthTracker, ProbeOutcome};
pub use domain::topology::Topology;
pub use ports::inbound::AgentPoolApi;
pub use service::{AgentPool, HealthSummary};
