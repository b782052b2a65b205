//! # BFT Round State Machine
//!
//! Pure, synchronous PBFT-style state for one consensus round. The async
//! driver feeds it messages and timeouts; it never blocks or reads a clock.
//!
//! ```text
//!                 pre-prepare            prepare quorum          commit quorum
//!   [PrePrepare] ─────────────▶ [Prepare] ─────────────▶ [Commit] ─────────────▶ [Committed]
//!        ▲                          │                        │
//!        │    view + 1, votes       │ timeout / conflicting  │ timeout
//!        │    discarded             │ proposals / >1/3       │
//!        └──────────────────────────┴────────────────────────┘
//!                         (view change, at most max_view_changes;
//!                          one more attempt ends in Timeout)
//! ```
//!
//! Primary for view `v` is `participants[v % n]`, in snapshot order.
//!
//! Agents caught equivocating, or a primary whose pre-prepares conflict
//! between two gossip neighbours, are flagged Byzantine. Their votes stay
//! recorded but are excluded from every tally of the round, and their
//! snapshot weight is removed from the total possible weight.

use super::config::ConsensusConfig;
use super::errors::ConsensusError;
use super::quorum::{exceeds_fraction, has_quorum, Tally};
use super::reputation::RoundParticipation;
use super::types::{
    ByzantineEvidence, ConsensusResult, ConsensusStatus, Participant, Phase, Vote,
};
use super::voting::{CastOutcome, VoteCollector};
use av_02_agent_pool::Topology;
use shared_types::{AgentId, RoundId, Timestamp, Verdict};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

const VERDICTS: [Verdict; 2] = [Verdict::Valid, Verdict::Invalid];

/// Protocol thresholds for one round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundParams {
    pub quorum_threshold: f64,
    pub view_change_threshold: f64,
    pub max_view_changes: u32,
}

impl From<&ConsensusConfig> for RoundParams {
    fn from(config: &ConsensusConfig) -> Self {
        Self {
            quorum_threshold: config.quorum_threshold,
            view_change_threshold: config.view_change_threshold,
            max_view_changes: config.max_view_changes,
        }
    }
}

/// Why a view change happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewChangeReason {
    PrePrepareTimeout,
    PhaseTimeout,
    ConflictingProposals,
    Requested,
}

impl ViewChangeReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrePrepareTimeout => "pre_prepare_timeout",
            Self::PhaseTimeout => "phase_timeout",
            Self::ConflictingProposals => "conflicting_proposals",
            Self::Requested => "requested",
        }
    }
}

/// State change caused by one input.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// Input stored, no transition.
    Recorded,
    /// Same vote seen before.
    Duplicate,
    /// Pre-prepare accepted; deliver each recipient its value.
    Accepted { deliveries: Vec<(AgentId, Verdict)> },
    /// Prepare quorum on a value; the round moved to Commit.
    Prepared(Verdict),
    /// Commit quorum; the value is final.
    Committed(Verdict),
    ViewChanged { view: u64, primary: AgentId },
    /// View changes exhausted.
    TimedOut,
}

/// Input the round refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("round already finished")]
    Finished,
    #[error("message for view {got}, round is in view {expected}")]
    WrongView { expected: u64, got: u64 },
    #[error("{0} is not a participant")]
    NotParticipant(AgentId),
    #[error("{0} is not the primary")]
    NotPrimary(AgentId),
    #[error("unexpected message in phase {0:?}")]
    UnexpectedPhase(Phase),
}

/// One consensus round over a fixed participant snapshot.
#[derive(Debug)]
pub struct BftRound {
    round_id: RoundId,
    participants: Vec<Participant>,
    index: HashMap<AgentId, usize>,
    params: RoundParams,
    topology: Topology,
    view: u64,
    phase: Phase,
    view_changes: u32,
    collector: VoteCollector,
    view_change_requests: HashSet<AgentId>,
    proposal: Option<Verdict>,
    prepared: Option<Verdict>,
    decided: Option<Verdict>,
    byzantine: HashSet<AgentId>,
    /// Detection order
    byzantine_order: Vec<AgentId>,
    evidence: Vec<ByzantineEvidence>,
    status: Option<ConsensusStatus>,
}

impl BftRound {
    pub fn new(
        round_id: RoundId,
        participants: Vec<Participant>,
        params: RoundParams,
        topology: Topology,
    ) -> Result<Self, ConsensusError> {
        if participants.is_empty() {
            return Err(ConsensusError::EmptyPool);
        }
        let index = participants
            .iter()
            .enumerate()
            .map(|(i, p)| (p.agent_id, i))
            .collect();
        Ok(Self {
            round_id,
            participants,
            index,
            params,
            topology,
            view: 0,
            phase: Phase::PrePrepare,
            view_changes: 0,
            collector: VoteCollector::new(0),
            view_change_requests: HashSet::new(),
            proposal: None,
            prepared: None,
            decided: None,
            byzantine: HashSet::new(),
            byzantine_order: Vec::new(),
            evidence: Vec::new(),
            status: None,
        })
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn round_id(&self) -> RoundId {
        self.round_id
    }

    pub fn view(&self) -> u64 {
        self.view
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn view_changes(&self) -> u32 {
        self.view_changes
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn primary(&self) -> AgentId {
        let n = self.participants.len() as u64;
        self.participants[(self.view % n) as usize].agent_id
    }

    pub fn decided(&self) -> Option<Verdict> {
        self.decided
    }

    pub fn prepared(&self) -> Option<Verdict> {
        self.prepared
    }

    pub fn status(&self) -> Option<ConsensusStatus> {
        self.status
    }

    /// Whether no further transitions can happen.
    pub fn is_finished(&self) -> bool {
        self.status.is_some()
    }

    pub fn is_byzantine(&self, agent: &AgentId) -> bool {
        self.byzantine.contains(agent)
    }

    pub fn byzantine_agents(&self) -> &[AgentId] {
        &self.byzantine_order
    }

    pub fn evidence(&self) -> &[ByzantineEvidence] {
        &self.evidence
    }

    /// Snapshot weight of participants not flagged Byzantine.
    pub fn total_possible_weight(&self) -> f64 {
        self.participants
            .iter()
            .filter(|p| !self.byzantine.contains(&p.agent_id))
            .map(|p| p.weight)
            .sum()
    }

    pub fn tally(&self, phase: Phase, value: Verdict) -> Tally {
        self.collector.tally(phase, value, &self.byzantine)
    }

    /// Every non-Byzantine participant has a commit vote in the current view.
    pub fn all_honest_committed(&self) -> bool {
        self.participants
            .iter()
            .filter(|p| !self.byzantine.contains(&p.agent_id))
            .all(|p| self.collector.has_voted(p.agent_id, Phase::Commit))
    }

    // =========================================================================
    // INPUTS
    // =========================================================================

    /// Handle the primary's pre-prepare: per-recipient proposed values.
    ///
    /// Values received by adjacent agents in the topology are cross-checked.
    /// A mismatch flags the primary and forces a view change.
    pub fn on_pre_prepare(
        &mut self,
        from: AgentId,
        view: u64,
        proposals: Vec<(AgentId, Verdict)>,
    ) -> Result<Progress, RejectReason> {
        self.check_open(view)?;
        if from != self.primary() {
            return Err(RejectReason::NotPrimary(from));
        }
        if self.phase != Phase::PrePrepare {
            return Err(RejectReason::UnexpectedPhase(self.phase));
        }

        let mut received: Vec<Option<Verdict>> = vec![None; self.participants.len()];
        let mut deliveries = Vec::with_capacity(proposals.len());
        for (recipient, value) in proposals {
            let Some(&i) = self.index.get(&recipient) else {
                continue;
            };
            if received[i].is_none() {
                received[i] = Some(value);
                deliveries.push((recipient, value));
            }
        }

        for (a, b) in self.topology.edges(self.participants.len()) {
            if let (Some(va), Some(vb)) = (received[a], received[b]) {
                if va != vb {
                    let evidence = ByzantineEvidence::ConflictingProposals {
                        primary: from,
                        view,
                        observers: (self.participants[a].agent_id, self.participants[b].agent_id),
                        values: (va, vb),
                    };
                    self.flag(evidence);
                    return Ok(self.view_change(ViewChangeReason::ConflictingProposals));
                }
            }
        }

        self.proposal = deliveries.first().map(|(_, v)| *v);
        self.phase = Phase::Prepare;
        debug!(round_id = %self.round_id, view, proposal = ?self.proposal, "pre-prepare accepted");
        Ok(Progress::Accepted { deliveries })
    }

    /// Record a prepare or commit vote and re-evaluate quorum.
    pub fn cast_vote(
        &mut self,
        agent: AgentId,
        view: u64,
        phase: Phase,
        value: Verdict,
        now: Timestamp,
    ) -> Result<Progress, RejectReason> {
        if self.status.is_some_and(|s| s != ConsensusStatus::Committed) {
            return Err(RejectReason::Finished);
        }
        if view != self.view {
            return Err(RejectReason::WrongView {
                expected: self.view,
                got: view,
            });
        }
        let Some(&i) = self.index.get(&agent) else {
            return Err(RejectReason::NotParticipant(agent));
        };
        let accepted = match phase {
            Phase::Prepare => matches!(
                self.phase,
                Phase::Prepare | Phase::Commit | Phase::Committed
            ),
            Phase::Commit => matches!(self.phase, Phase::Commit | Phase::Committed),
            _ => false,
        };
        if !accepted {
            return Err(RejectReason::UnexpectedPhase(self.phase));
        }

        let vote = Vote {
            agent_id: agent,
            round_id: self.round_id,
            view,
            phase,
            value,
            weight: self.participants[i].weight,
            timestamp: now,
        };
        match self.collector.cast(vote) {
            CastOutcome::Duplicate => return Ok(Progress::Duplicate),
            CastOutcome::Recorded => {}
            CastOutcome::Equivocation(evidence) => self.flag(evidence),
        }
        Ok(self.evaluate())
    }

    /// Record a replica's request to abandon the current view.
    ///
    /// Executes once requesters hold strictly more than
    /// `view_change_threshold` of the possible weight.
    pub fn on_view_change_request(
        &mut self,
        agent: AgentId,
        view: u64,
    ) -> Result<Progress, RejectReason> {
        self.check_open(view)?;
        if !self.index.contains_key(&agent) {
            return Err(RejectReason::NotParticipant(agent));
        }
        if !self.view_change_requests.insert(agent) {
            return Ok(Progress::Duplicate);
        }
        let requested: f64 = self
            .participants
            .iter()
            .filter(|p| {
                self.view_change_requests.contains(&p.agent_id)
                    && !self.byzantine.contains(&p.agent_id)
            })
            .map(|p| p.weight)
            .sum();
        if exceeds_fraction(
            requested,
            self.total_possible_weight(),
            self.params.view_change_threshold,
        ) {
            return Ok(self.view_change(ViewChangeReason::Requested));
        }
        Ok(Progress::Recorded)
    }

    /// A pre-prepare or phase deadline passed.
    pub fn on_timeout(&mut self, reason: ViewChangeReason) -> Progress {
        if self.status.is_some() {
            return Progress::Recorded;
        }
        self.view_change(reason)
    }

    /// Cancel the round. Partial state is kept only for inspection.
    pub fn abort(&mut self) {
        if self.status.is_none() {
            self.phase = Phase::Aborted;
            self.status = Some(ConsensusStatus::Aborted);
        }
    }

    // =========================================================================
    // OUTPUTS
    // =========================================================================

    /// Build the round result. `bft_safe` is the pool's sizing at round start.
    pub fn result(&self, bft_safe: bool) -> ConsensusResult {
        let status = self.status.unwrap_or(ConsensusStatus::Timeout);
        let tally = match self.decided {
            Some(value) => self.tally(Phase::Commit, value),
            None => self.tally(Phase::Prepare, Verdict::Valid),
        };
        let total_weight = self.total_possible_weight();
        let consensus_score = if total_weight > 0.0 {
            (tally.for_weight / total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let value = if status == ConsensusStatus::Committed {
            self.decided
        } else {
            None
        };
        ConsensusResult {
            round_id: self.round_id,
            status,
            verified: value == Some(Verdict::Valid),
            value,
            votes_for: tally.for_weight,
            votes_against: tally.against_weight,
            total_weight,
            participating_agents: self.participants.iter().map(|p| p.agent_id).collect(),
            consensus_score,
            byzantine_agents_detected: self.byzantine_order.clone(),
            evidence: self.evidence.clone(),
            view: self.view,
            view_changes: self.view_changes,
            bft_safe,
        }
    }

    /// Reputation outcomes. Decided rounds judge every participant by its
    /// commit vote; undecided rounds only punish Byzantine agents.
    pub fn participations(&self) -> Vec<(AgentId, RoundParticipation)> {
        self.participants
            .iter()
            .filter_map(|p| {
                let id = p.agent_id;
                if self.byzantine.contains(&id) {
                    return Some((id, RoundParticipation::Byzantine));
                }
                let decided = self.decided?;
                Some(match self.collector.value_of(id, Phase::Commit) {
                    Some(v) if v == decided => (id, RoundParticipation::Agreed),
                    Some(_) => (id, RoundParticipation::Disagreed),
                    None => (id, RoundParticipation::Silent),
                })
            })
            .collect()
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    fn check_open(&self, view: u64) -> Result<(), RejectReason> {
        if self.status.is_some() {
            return Err(RejectReason::Finished);
        }
        if view != self.view {
            return Err(RejectReason::WrongView {
                expected: self.view,
                got: view,
            });
        }
        Ok(())
    }

    fn flag(&mut self, evidence: ByzantineEvidence) {
        let agent = evidence.agent_id();
        warn!(round_id = %self.round_id, agent_id = %agent, view = evidence.view(), "byzantine behaviour detected");
        if self.byzantine.insert(agent) {
            self.byzantine_order.push(agent);
        }
        self.evidence.push(evidence);
    }

    fn evaluate(&mut self) -> Progress {
        let total = self.total_possible_weight();
        let threshold = self.params.quorum_threshold;
        match self.phase {
            Phase::Prepare => {
                for value in VERDICTS {
                    if has_quorum(&self.tally(Phase::Prepare, value), total, threshold) {
                        self.prepared = Some(value);
                        self.phase = Phase::Commit;
                        debug!(round_id = %self.round_id, view = self.view, %value, "prepare quorum");
                        return Progress::Prepared(value);
                    }
                }
                Progress::Recorded
            }
            Phase::Commit => {
                for value in VERDICTS {
                    if has_quorum(&self.tally(Phase::Commit, value), total, threshold) {
                        self.decided = Some(value);
                        self.phase = Phase::Committed;
                        self.status = Some(ConsensusStatus::Committed);
                        debug!(round_id = %self.round_id, view = self.view, %value, "commit quorum");
                        return Progress::Committed(value);
                    }
                }
                Progress::Recorded
            }
            _ => Progress::Recorded,
        }
    }

    fn view_change(&mut self, reason: ViewChangeReason) -> Progress {
        if self.view_changes >= self.params.max_view_changes {
            self.phase = Phase::ViewChange;
            self.status = Some(ConsensusStatus::Timeout);
            warn!(
                round_id = %self.round_id,
                view = self.view,
                view_changes = self.view_changes,
                reason = reason.as_str(),
                "view changes exhausted"
            );
            return Progress::TimedOut;
        }
        self.view += 1;
        self.view_changes += 1;
        self.collector = VoteCollector::new(self.view);
        self.view_change_requests.clear();
        self.proposal = None;
        self.prepared = None;
        self.phase = Phase::PrePrepare;
        let primary = self.primary();
        debug!(
            round_id = %self.round_id,
            view = self.view,
            primary = %primary,
            reason = reason.as_str(),
            "view change"
        );
        Progress::ViewChanged {
            view: self.view,
            primary,
        }
    }
}
