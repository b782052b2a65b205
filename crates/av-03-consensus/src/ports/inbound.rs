//! Driving ports (Inbound API)

use crate::domain::{ConsensusError, ConsensusResult};
use crate::service::CancelHandle;
use async_trait::async_trait;
use av_02_agent_pool::Proposition;
use shared_types::Verdict;

/// Primary consensus API.
///
/// Every call returns only once the round is terminal: committed, timed
/// out, aborted, or refused for insufficient participation.
#[async_trait]
pub trait ConsensusApi: Send + Sync {
    /// Have the pool agree on whether `signature` is valid for
    /// `(public_key, message)`.
    ///
    /// Malformed key or signature lengths fail fast with
    /// `ConsensusError::Crypto` before any round starts.
    async fn verify_with_consensus(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<ConsensusResult, ConsensusError>;

    /// Agree on a caller-supplied verdict.
    async fn propose_and_vote(&self, value: Verdict) -> Result<ConsensusResult, ConsensusError>;

    /// Run one round on `proposition`, abortable through `cancel`.
    async fn run(
        &self,
        proposition: Proposition,
        cancel: CancelHandle,
    ) -> Result<ConsensusResult, ConsensusError>;
}
