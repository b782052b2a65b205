//! # Consensus Domain
//!
//! Pure consensus logic: quorum arithmetic, vote collection, reputation and
//! the per-round BFT state machine. Nothing here suspends or reads a clock;
//! callers pass timestamps in.

pub mod config;
pub mod errors;
pub mod quorum;
pub mod reputation;
pub mod round;
pub mod types;
pub mod voting;

pub use config::{ConsensusConfig, ReputationConfig};
pub use errors::ConsensusError;
pub use quorum::{has_quorum, quorum_weight, Tally, DEFAULT_QUORUM_THRESHOLD};
pub use reputation::{ReputationEntry, ReputationStats, ReputationSystem, RoundParticipation};
pub use round::{BftRound, Progress, RejectReason, RoundParams, ViewChangeReason};
pub use types::{
    ByzantineEvidence, ConsensusDecision, ConsensusResult, ConsensusStatus, Participant, Phase,
    Vote,
};
pub use voting::{CastOutcome, VoteCollector};
