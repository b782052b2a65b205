//! # Vote Collection - Equivocation Detection
//!
//! One [`VoteCollector`] holds the votes of a single view. Votes are indexed
//! by `(agent, phase)`:
//!
//! 1. First vote for the key is recorded.
//! 2. A repeat of the same value is an idempotent duplicate.
//! 3. A different value is equivocation; evidence is produced and the agent
//!    must be excluded from every tally of the round.
//!
//! Tallies are a pure function of the recorded votes and the exclusion set,
//! so any observer holding the same votes computes the same quorum.

use super::quorum::Tally;
use super::types::{ByzantineEvidence, Phase, Vote};
use shared_types::{AgentId, Verdict};
use std::collections::{HashMap, HashSet};

/// Result of offering a vote to the collector.
#[derive(Debug, Clone, PartialEq)]
pub enum CastOutcome {
    Recorded,
    Duplicate,
    Equivocation(ByzantineEvidence),
}

/// Votes of one view of one round.
#[derive(Debug)]
pub struct VoteCollector {
    view: u64,
    /// (agent, phase) -> first vote
    votes: HashMap<(AgentId, Phase), Vote>,
    /// Keys already reported as equivocating
    equivocated: HashSet<(AgentId, Phase)>,
}

impl VoteCollector {
    pub fn new(view: u64) -> Self {
        Self {
            view,
            votes: HashMap::new(),
            equivocated: HashSet::new(),
        }
    }

    pub fn view(&self) -> u64 {
        self.view
    }

    /// Record a vote, detecting double votes.
    ///
    /// Equivocation is reported once per `(agent, phase)`; further
    /// conflicting votes from the same agent come back as duplicates.
    pub fn cast(&mut self, vote: Vote) -> CastOutcome {
        let key = (vote.agent_id, vote.phase);
        match self.votes.get(&key) {
            None => {
                self.votes.insert(key, vote);
                CastOutcome::Recorded
            }
            Some(prev) if prev.value.canonical_byte() == vote.value.canonical_byte() => {
                CastOutcome::Duplicate
            }
            Some(prev) => {
                if !self.equivocated.insert(key) {
                    return CastOutcome::Duplicate;
                }
                CastOutcome::Equivocation(ByzantineEvidence::Equivocation {
                    agent_id: vote.agent_id,
                    view: self.view,
                    phase: vote.phase,
                    first: prev.value,
                    second: vote.value,
                })
            }
        }
    }

    /// Weighted sums for `phase` relative to `value`, ignoring `excluded`.
    pub fn tally(&self, phase: Phase, value: Verdict, excluded: &HashSet<AgentId>) -> Tally {
        let mut tally = Tally::default();
        for vote in self.phase_votes(phase) {
            if excluded.contains(&vote.agent_id) {
                continue;
            }
            tally.total_weight += vote.weight;
            if vote.value.canonical_byte() == value.canonical_byte() {
                tally.for_weight += vote.weight;
            } else {
                tally.against_weight += vote.weight;
            }
        }
        tally
    }

    /// Whether `agent` has voted in `phase` of this view.
    pub fn has_voted(&self, agent: AgentId, phase: Phase) -> bool {
        self.votes.contains_key(&(agent, phase))
    }

    /// Recorded value of `agent` in `phase`.
    pub fn value_of(&self, agent: AgentId, phase: Phase) -> Option<Verdict> {
        self.votes.get(&(agent, phase)).map(|v| v.value)
    }

    pub fn phase_votes(&self, phase: Phase) -> impl Iterator<Item = &Vote> {
        self.votes.values().filter(move |v| v.phase == phase)
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}
