//! Consensus value types.

use serde::{Deserialize, Serialize};
use shared_types::{AgentId, RoundId, Timestamp, Verdict};

/// Protocol phase of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    PrePrepare,
    Prepare,
    Commit,
    Committed,
    /// A view change was due but none remain; the round ended as `Timeout`.
    ViewChange,
    Aborted,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Committed | Phase::Aborted)
    }
}

/// One recorded vote. Immutable; `weight` is the snapshot taken at round
/// start so later reputation changes never alter this round's quorum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub agent_id: AgentId,
    pub round_id: RoundId,
    pub view: u64,
    pub phase: Phase,
    pub value: Verdict,
    pub weight: f64,
    pub timestamp: Timestamp,
}

/// Agent and weight captured when a round starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub agent_id: AgentId,
    pub weight: f64,
}

/// Proof that an agent deviated from the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ByzantineEvidence {
    /// Two different values in one phase of one view.
    Equivocation {
        agent_id: AgentId,
        view: u64,
        phase: Phase,
        first: Verdict,
        second: Verdict,
    },
    /// Primary sent different pre-prepares to two gossip neighbours.
    ConflictingProposals {
        primary: AgentId,
        view: u64,
        observers: (AgentId, AgentId),
        values: (Verdict, Verdict),
    },
}

impl ByzantineEvidence {
    /// The agent this evidence incriminates.
    pub fn agent_id(&self) -> AgentId {
        match self {
            Self::Equivocation { agent_id, .. } => *agent_id,
            Self::ConflictingProposals { primary, .. } => *primary,
        }
    }

    pub fn view(&self) -> u64 {
        match self {
            Self::Equivocation { view, .. } | Self::ConflictingProposals { view, .. } => *view,
        }
    }
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsensusStatus {
    Committed,
    /// `max_view_changes` exhausted without a decision.
    Timeout,
    /// Usable weight could never reach quorum; the round did not start.
    InsufficientParticipants,
    /// Cancelled by the caller.
    Aborted,
}

impl ConsensusStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConsensusStatus::Committed => "committed",
            ConsensusStatus::Timeout => "timeout",
            ConsensusStatus::InsufficientParticipants => "insufficient_participants",
            ConsensusStatus::Aborted => "aborted",
        }
    }
}

/// Final outcome of one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub round_id: RoundId,
    pub status: ConsensusStatus,
    /// True only when committed on `Verdict::Valid`.
    pub verified: bool,
    /// The committed value, if any.
    pub value: Option<Verdict>,
    pub votes_for: f64,
    pub votes_against: f64,
    /// Total possible weight: snapshot weight of participants not flagged Byzantine.
    pub total_weight: f64,
    pub participating_agents: Vec<AgentId>,
    /// `votes_for / total_weight`, in `[0, 1]`.
    pub consensus_score: f64,
    pub byzantine_agents_detected: Vec<AgentId>,
    pub evidence: Vec<ByzantineEvidence>,
    pub view: u64,
    pub view_changes: u32,
    /// Pool held at least `3f + 1` agents when the round started.
    pub bft_safe: bool,
}

impl ConsensusResult {
    pub fn is_committed(&self) -> bool {
        self.status == ConsensusStatus::Committed
    }

    /// Result for a round that never started.
    pub fn insufficient(
        round_id: RoundId,
        participating_agents: Vec<AgentId>,
        total_weight: f64,
        bft_safe: bool,
    ) -> Self {
        Self {
            round_id,
            status: ConsensusStatus::InsufficientParticipants,
            verified: false,
            value: None,
            votes_for: 0.0,
            votes_against: 0.0,
            total_weight,
            participating_agents,
            consensus_score: 0.0,
            byzantine_agents_detected: Vec::new(),
            evidence: Vec::new(),
            view: 0,
            view_changes: 0,
            bft_safe,
        }
    }
}

/// Record handed to lineage collaborators after every terminal round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusDecision {
    pub round_id: RoundId,
    pub status: ConsensusStatus,
    pub value: Option<Verdict>,
    pub view: u64,
    pub participants: Vec<AgentId>,
    pub byzantine_agents: Vec<AgentId>,
    pub decided_at: Timestamp,
}

impl ConsensusDecision {
    pub fn from_result(result: &ConsensusResult, decided_at: Timestamp) -> Self {
        Self {
            round_id: result.round_id,
            status: result.status,
            value: result.value,
            view: result.view,
            participants: result.participating_agents.clone(),
            byzantine_agents: result.byzantine_agents_detected.clone(),
            decided_at,
        }
    }
}
