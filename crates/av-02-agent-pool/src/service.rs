//! # Agent Pool Service
//!
//! Owns the agents. Membership is an ordered list plus an id index behind a
//! single `RwLock`: many rounds snapshot concurrently, spawns and removals
//! serialize.

use crate::domain::agent::Agent;
use crate::domain::behavior::AgentBehavior;
use crate::domain::config::PoolConfig;
use crate::domain::errors::PoolError;
use crate::domain::health::HealthStatus;
use crate::domain::topology::Topology;
use crate::ports::inbound::AgentPoolApi;
use av_01_signature_verification::SignatureManager;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_crypto::Identity;
use shared_types::{AgentId, AgentRole};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of probing the whole pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub healthy: usize,
    pub degraded: usize,
    pub unreachable: usize,
    pub evicted: Vec<AgentId>,
}

#[derive(Default)]
struct Members {
    agents: Vec<Arc<Agent>>,
    lookup: HashMap<AgentId, usize>,
}

impl Members {
    fn reindex(&mut self) {
        self.lookup = self
            .agents
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id(), i))
            .collect();
    }
}

/// Pool of verifier agents.
pub struct AgentPool {
    config: PoolConfig,
    verifier: Arc<SignatureManager>,
    members: RwLock<Members>,
}

impl AgentPool {
    pub fn new(config: PoolConfig, verifier: Arc<SignatureManager>) -> Result<Self, PoolError> {
        config.validate()?;
        Ok(Self {
            config,
            verifier,
            members: RwLock::new(Members::default()),
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn topology(&self) -> Topology {
        self.config.topology
    }

    pub fn verifier(&self) -> &Arc<SignatureManager> {
        &self.verifier
    }

    pub fn len(&self) -> usize {
        self.members.read().agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, agent_id: &AgentId) -> Option<Arc<Agent>> {
        let members = self.members.read();
        members
            .lookup
            .get(agent_id)
            .map(|&i| members.agents[i].clone())
    }

    /// All members regardless of health, in spawn order.
    pub fn agents(&self) -> Vec<Arc<Agent>> {
        self.members.read().agents.clone()
    }

    /// Byzantine agents tolerated by the current size: `(n - 1) / 3`.
    pub fn tolerated_faults(&self) -> usize {
        self.len().saturating_sub(1) / 3
    }

    /// Spawn with an explicit role.
    pub fn spawn_with_role(
        &self,
        count: usize,
        initial_weight: f64,
        role: AgentRole,
    ) -> Result<Vec<Arc<Agent>>, PoolError> {
        if !initial_weight.is_finite() || initial_weight < 0.0 {
            return Err(PoolError::InvalidWeight(initial_weight));
        }
        let current = self.len();
        if current + count > self.config.max_pool_size {
            return Err(PoolError::PoolCapacity {
                requested: count,
                current,
                max: self.config.max_pool_size,
            });
        }

        // Identities first so an entropy failure leaves the pool untouched.
        let spawned = (0..count)
            .map(|_| {
                Identity::generate().map(|identity| {
                    Arc::new(Agent::new(
                        identity,
                        role,
                        initial_weight,
                        self.verifier.clone(),
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut members = self.members.write();
        // Re-check under the write lock; another spawn may have raced us.
        if members.agents.len() + count > self.config.max_pool_size {
            return Err(PoolError::PoolCapacity {
                requested: count,
                current: members.agents.len(),
                max: self.config.max_pool_size,
            });
        }
        for agent in &spawned {
            let idx = members.agents.len();
            members.lookup.insert(agent.id(), idx);
            members.agents.push(agent.clone());
        }
        info!(count, total = members.agents.len(), "spawned agents");
        Ok(spawned)
    }

    /// Inject a fault behaviour.
    pub fn set_behavior(&self, agent_id: AgentId, behavior: AgentBehavior) -> Result<(), PoolError> {
        let agent = self.get(&agent_id).ok_or(PoolError::AgentNotFound(agent_id))?;
        agent.set_behavior(behavior);
        debug!(agent = %agent_id, ?behavior, "behavior set");
        Ok(())
    }
}

impl AgentPoolApi for AgentPool {
    fn spawn(&self, count: usize, initial_weight: f64) -> Result<Vec<Arc<Agent>>, PoolError> {
        self.spawn_with_role(count, initial_weight, AgentRole::Verifier)
    }

    fn health_check(&self, agent_id: AgentId) -> Result<HealthStatus, PoolError> {
        let agent = self.get(&agent_id).ok_or(PoolError::AgentNotFound(agent_id))?;
        let (status, evict) = agent.probe(&self.config.health);
        if evict {
            warn!(agent = %agent_id, "evicting agent after sustained health failure");
            self.remove(agent_id)?;
        }
        Ok(status)
    }

    fn health_check_all(&self) -> HealthSummary {
        let mut summary = HealthSummary::default();
        for agent in self.agents() {
            let (status, evict) = agent.probe(&self.config.health);
            match status {
                HealthStatus::Healthy => summary.healthy += 1,
                HealthStatus::Degraded => summary.degraded += 1,
                HealthStatus::Unreachable => summary.unreachable += 1,
            }
            if evict && self.remove(agent.id()).is_ok() {
                warn!(agent = %agent.id(), "evicting agent after sustained health failure");
                summary.evicted.push(agent.id());
            }
        }
        summary
    }

    fn remove(&self, agent_id: AgentId) -> Result<Arc<Agent>, PoolError> {
        let mut members = self.members.write();
        let index = members
            .lookup
            .remove(&agent_id)
            .ok_or(PoolError::AgentNotFound(agent_id))?;
        let agent = members.agents.remove(index);
        members.reindex();
        debug!(agent = %agent_id, remaining = members.agents.len(), "agent removed");
        Ok(agent)
    }

    fn participants(&self) -> Vec<Arc<Agent>> {
        self.members
            .read()
            .agents
            .iter()
            .filter(|a| a.health().is_usable())
            .cloned()
            .collect()
    }

    fn is_bft_safe(&self) -> bool {
        self.len() >= self.config.min_bft_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use av_01_signature_verification::{CacheConfig, SignatureCache};

    fn pool(max_pool_size: usize) -> AgentPool {
        let cache = SignatureCache::new(&CacheConfig::default()).unwrap();
        AgentPool::new(
            PoolConfig {
                max_pool_size,
                ..PoolConfig::default()
            },
            Arc::new(SignatureManager::new(Arc::new(cache))),
        )
        .unwrap()
    }

    #[test]
    fn test_spawn_assigns_distinct_identities() {
        let pool = pool(10);
        let agents = pool.spawn(4, 1.0).unwrap();

        assert_eq!(pool.len(), 4);
        let mut dids: Vec<_> = agents.iter().map(|a| a.did().to_string()).collect();
        dids.sort();
        dids.dedup();
        assert_eq!(dids.len(), 4);
        assert!(agents.iter().all(|a| a.initial_weight() == 1.0));
    }

    #[test]
    fn test_spawn_over_capacity_fails_without_partial_state() {
        let pool = pool(5);
        pool.spawn(3, 1.0).unwrap();

        let err = pool.spawn(3, 1.0).unwrap_err();
        assert_eq!(
            err,
            PoolError::PoolCapacity {
                requested: 3,
                current: 3,
                max: 5
            }
        );
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_invalid_weight_rejected() {
        let pool = pool(5);
        assert!(matches!(pool.spawn(1, -1.0), Err(PoolError::InvalidWeight(_))));
        assert!(matches!(pool.spawn(1, f64::NAN), Err(PoolError::InvalidWeight(_))));
    }

    #[test]
    fn test_bft_safety_threshold() {
        let pool = pool(10);
        pool.spawn(3, 1.0).unwrap();
        assert!(!pool.is_bft_safe());
        assert_eq!(pool.tolerated_faults(), 0);

        pool.spawn(1, 1.0).unwrap();
        assert!(pool.is_bft_safe());
        assert_eq!(pool.tolerated_faults(), 1);
    }

    #[test]
    fn test_remove_keeps_order_and_index() {
        let pool = pool(10);
        let agents = pool.spawn(4, 1.0).unwrap();

        let removed = pool.remove(agents[1].id()).unwrap();
        assert_eq!(removed.id(), agents[1].id());

        let ids: Vec<_> = pool.participants().iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec![agents[0].id(), agents[2].id(), agents[3].id()]);
        assert!(pool.get(&agents[3].id()).is_some());
        assert_eq!(
            pool.remove(agents[1].id()).unwrap_err(),
            PoolError::AgentNotFound(agents[1].id())
        );
    }

    #[test]
    fn test_crashed_agent_excluded_then_evicted() {
        let pool = pool(10);
        let agents = pool.spawn(4, 1.0).unwrap();
        let crashed = agents[2].id();
        pool.set_behavior(crashed, AgentBehavior::Crashed).unwrap();

        assert_eq!(pool.health_check(crashed).unwrap(), HealthStatus::Unreachable);
        assert_eq!(pool.participants().len(), 3);
        assert_eq!(pool.len(), 4);

        pool.health_check(crashed).unwrap();
        pool.health_check(crashed).unwrap();
        assert!(pool.get(&crashed).is_none());
        assert!(matches!(
            pool.health_check(crashed),
            Err(PoolError::AgentNotFound(_))
        ));
    }

    #[test]
    fn test_health_check_all_summary() {
        let pool = pool(10);
        let agents = pool.spawn(3, 1.0).unwrap();
        pool.set_behavior(agents[0].id(), AgentBehavior::Crashed)
            .unwrap();

        let summary = pool.health_check_all();
        assert_eq!(summary.unreachable, 1);
        assert_eq!(summary.healthy + summary.degraded, 2);
        assert!(summary.evicted.is_empty());
    }

    #[test]
    fn test_recovered_agent_rejoins() {
        let pool = pool(10);
        let agents = pool.spawn(2, 1.0).unwrap();
        let id = agents[0].id();
        pool.set_behavior(id, AgentBehavior::Crashed).unwrap();
        pool.health_check(id).unwrap();
        assert_eq!(pool.participants().len(), 1);

        pool.set_behavior(id, AgentBehavior::Honest).unwrap();
        assert!(pool.health_check(id).unwrap().is_usable());
        assert_eq!(pool.participants().len(), 2);
    }
}
