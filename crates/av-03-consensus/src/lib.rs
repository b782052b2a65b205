//! # av-03-consensus
//!
//! Weighted PBFT-style agreement among verifier agents.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): quorum arithmetic, vote collection with
//!   equivocation detection, reputation, and [`BftRound`], a pure state
//!   machine for one round.
//! - **Ports Layer** (`ports/`): inbound [`ConsensusApi`], outbound
//!   [`DecisionSink`].
//! - **Service Layer** (`service/`): [`ConsensusService`], which runs each
//!   participant as a tokio task and drives the round with timeouts.
//! - **Adapters** (`adapters/`): in-memory decision log.
//!
//! ```text
//!   caller ──verify_with_consensus──▶ ConsensusService
//!                                         │  snapshot participants + weights
//!                                         ▼
//!                                    ┌─────────┐  Propose / PrePrepare / Prepared
//!                                    │ driver  │ ───────────────────────────────▶ replicas (1 task per agent)
//!                                    │         │ ◀─────────────────────────────── votes, view-change requests
//!                                    └────┬────┘
//!                                         │  BftRound (pure)
//!                                         ▼
//!                        ConsensusResult + reputation update + DecisionSink
//! ```
//!
//! ## Safety
//!
//! - Quorum: `for_weight >= 2/3 * total_possible_weight`
//! - Equivocating agents and conflicting primaries are excluded retroactively
//! - View changes are bounded; exhaustion is reported as `Timeout`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use av_03_consensus::{ConsensusApi, ConsensusConfig, ConsensusService, InMemoryDecisionLog};
//!
//! let service = ConsensusService::new(pool, Arc::new(InMemoryDecisionLog::new()), ConsensusConfig::default())?;
//! let result = service.verify_with_consensus(message, signature, public_key).await?;
//! assert!(result.verified);
//! ```

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-export main types
pub use adapters::{InMemoryDecisionLog, NoopDecisionSink};
pub use domain::{
    BftRound, ByzantineEvidence, ConsensusConfig, ConsensusDecision, ConsensusError,
    ConsensusResult, ConsensusStatus, Participant, Phase, ReputationConfig, ReputationEntry,
    ReputationStats, ReputationSystem, RoundParticipation, Vote,
};
pub use ports::{ConsensusApi, DecisionSink};
pub use service::{CancelHandle, ConsensusService};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consensus_config_default() {
        let config = ConsensusConfig::default();
        assert!((config.quorum_threshold - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(config.max_view_changes, 3);
        assert_eq!(config.pre_prepare_timeout.as_millis(), 500);
        assert_eq!(config.reputation.initial_weight, 1.0);
    }
}
