//! # Inbound Ports
//!
//! Pool membership API consumed by the consensus core and the runtime.

use crate::domain::agent::Agent;
use crate::domain::errors::PoolError;
use crate::domain::health::HealthStatus;
use crate::service::HealthSummary;
use shared_types::AgentId;
use std::sync::Arc;

/// Agent pool API.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait AgentPoolApi: Send + Sync {
    /// Create `count` agents with fresh identities.
    ///
    /// Fails with `PoolCapacity` before creating anything if the pool would
    /// exceed its maximum size.
    fn spawn(&self, count: usize, initial_weight: f64) -> Result<Vec<Arc<Agent>>, PoolError>;

    /// Probe one agent. Evicts it after sustained failure.
    fn health_check(&self, agent_id: AgentId) -> Result<HealthStatus, PoolError>;

    /// Probe every agent.
    fn health_check_all(&self) -> HealthSummary;

    /// Remove from future rounds. Rounds already running keep its votes.
    fn remove(&self, agent_id: AgentId) -> Result<Arc<Agent>, PoolError>;

    /// Snapshot of agents eligible for a new round, in spawn order.
    fn participants(&self) -> Vec<Arc<Agent>>;

    /// Whether the pool holds at least `3f + 1` agents.
    fn is_bft_safe(&self) -> bool;
}
