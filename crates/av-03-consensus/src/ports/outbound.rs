//! Driven ports (Outbound dependencies)

use crate::domain::ConsensusDecision;
use async_trait::async_trait;

/// Receives one record per terminal round, for lineage and audit.
///
/// A failing sink never changes the round's result; the service logs and
/// carries on.
#[async_trait]
pub trait DecisionSink: Send + Sync {
    async fn record(&self, decision: ConsensusDecision) -> Result<(), String>;
}
