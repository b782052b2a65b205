//! Decision sink adapters
//!
//! Implements the DecisionSink port in memory.

use crate::domain::{ConsensusDecision, ConsensusStatus};
use crate::ports::DecisionSink;
use async_trait::async_trait;
use shared_types::RoundId;

/// In-memory decision log
pub struct InMemoryDecisionLog {
    decisions: parking_lot::RwLock<Vec<ConsensusDecision>>,
}

impl InMemoryDecisionLog {
    pub fn new() -> Self {
        Self {
            decisions: parking_lot::RwLock::new(Vec::new()),
        }
    }

    pub fn decisions(&self) -> Vec<ConsensusDecision> {
        self.decisions.read().clone()
    }

    pub fn get(&self, round_id: &RoundId) -> Option<ConsensusDecision> {
        self.decisions
            .read()
            .iter()
            .find(|d| d.round_id == *round_id)
            .cloned()
    }

    pub fn count_by_status(&self, status: ConsensusStatus) -> usize {
        self.decisions
            .read()
            .iter()
            .filter(|d| d.status == status)
            .count()
    }

    pub fn len(&self) -> usize {
        self.decisions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.read().is_empty()
    }
}

impl Default for InMemoryDecisionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DecisionSink for InMemoryDecisionLog {
    async fn record(&self, decision: ConsensusDecision) -> Result<(), String> {
        self.decisions.write().push(decision);
        Ok(())
    }
}

/// Sink that discards every decision.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDecisionSink;

#[async_trait]
impl DecisionSink for NoopDecisionSink {
    async fn record(&self, _decision: ConsensusDecision) -> Result<(), String> {
        Ok(())
    }
}
