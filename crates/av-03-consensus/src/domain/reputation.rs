//! # Reputation
//!
//! Weighted trust per agent. Weights only change here, after a round ends:
//!
//! | Participation | Update                         |
//! |---------------|--------------------------------|
//! | Agreed        | `w * (1 + learning_rate)`      |
//! | Disagreed     | `w * (1 - learning_rate)`      |
//! | Silent        | `w * (1 - timeout_penalty)`    |
//! | Byzantine     | `w * byzantine_factor`         |
//!
//! Every result is clamped to `[min_weight, max_weight]`. Rounds read a
//! snapshot at start, so updates never alter an in-flight quorum.

use super::config::ReputationConfig;
use super::types::Participant;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::{AgentId, TimeSource, Timestamp};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Reputation record for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationEntry {
    pub weight: f64,
    /// Rounds where the agent's commit matched the decision
    pub correct: u64,
    pub incorrect: u64,
    /// Decided rounds the agent did not vote in
    pub timeouts: u64,
    pub byzantine_faults: u64,
    pub last_updated: Timestamp,
}

impl ReputationEntry {
    fn new(weight: f64, now: Timestamp) -> Self {
        Self {
            weight,
            correct: 0,
            incorrect: 0,
            timeouts: 0,
            byzantine_faults: 0,
            last_updated: now,
        }
    }

    /// Fraction of judged rounds that matched the decision.
    pub fn accuracy(&self) -> f64 {
        let judged = self.correct + self.incorrect;
        if judged == 0 {
            return 0.0;
        }
        self.correct as f64 / judged as f64
    }
}

/// How an agent took part in a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundParticipation {
    Agreed,
    Disagreed,
    Silent,
    Byzantine,
}

/// Aggregate view of the weight table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReputationStats {
    pub agents: usize,
    pub mean_weight: f64,
    pub min_weight: f64,
    pub max_weight: f64,
    /// Agents with at least one Byzantine fault
    pub byzantine_agents: usize,
}

/// Shared weight table. Concurrent reads, serialized writes.
pub struct ReputationSystem {
    config: ReputationConfig,
    entries: RwLock<HashMap<AgentId, ReputationEntry>>,
    clock: Arc<dyn TimeSource>,
}

impl ReputationSystem {
    pub fn new(config: ReputationConfig, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub fn config(&self) -> &ReputationConfig {
        &self.config
    }

    /// Register an agent with a starting weight. Existing entries are kept.
    pub fn register(&self, agent: AgentId, weight: f64) {
        let now = self.clock.now();
        self.entries
            .write()
            .entry(agent)
            .or_insert_with(|| ReputationEntry::new(weight, now));
    }

    /// Current weight; unknown agents get the configured initial weight.
    pub fn weight_of(&self, agent: &AgentId) -> f64 {
        self.entries
            .read()
            .get(agent)
            .map(|e| e.weight)
            .unwrap_or(self.config.initial_weight)
    }

    pub fn entry(&self, agent: &AgentId) -> Option<ReputationEntry> {
        self.entries.read().get(agent).cloned()
    }

    /// Snapshot weights for a round about to start.
    pub fn snapshot(&self, agents: &[AgentId]) -> Vec<Participant> {
        let entries = self.entries.read();
        agents
            .iter()
            .map(|id| Participant {
                agent_id: *id,
                weight: entries
                    .get(id)
                    .map(|e| e.weight)
                    .unwrap_or(self.config.initial_weight),
            })
            .collect()
    }

    /// Apply the outcome of one round atomically.
    pub fn apply_round(&self, outcomes: &[(AgentId, RoundParticipation)]) {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        for (agent, participation) in outcomes {
            let entry = entries
                .entry(*agent)
                .or_insert_with(|| ReputationEntry::new(self.config.initial_weight, now));
            let factor = match participation {
                RoundParticipation::Agreed => {
                    entry.correct += 1;
                    1.0 + self.config.learning_rate
                }
                RoundParticipation::Disagreed => {
                    entry.incorrect += 1;
                    1.0 - self.config.learning_rate
                }
                RoundParticipation::Silent => {
                    entry.timeouts += 1;
                    1.0 - self.config.timeout_penalty
                }
                RoundParticipation::Byzantine => {
                    entry.byzantine_faults += 1;
                    self.config.byzantine_factor
                }
            };
            entry.weight = self.clamp(entry.weight * factor);
            entry.last_updated = now;
        }
    }

    /// Pull every weight toward the initial weight by `decay_rate` per elapsed second.
    pub fn apply_decay(&self, elapsed: Duration) {
        let pull = (self.config.decay_rate * elapsed.as_secs_f64()).min(1.0);
        if pull <= 0.0 {
            return;
        }
        let target = self.config.initial_weight;
        for entry in self.entries.write().values_mut() {
            entry.weight = self.clamp(entry.weight + (target - entry.weight) * pull);
        }
    }

    pub fn remove(&self, agent: &AgentId) -> Option<ReputationEntry> {
        self.entries.write().remove(agent)
    }

    /// Agents sorted by descending weight.
    pub fn ranked(&self) -> Vec<(AgentId, f64)> {
        let mut ranked: Vec<(AgentId, f64)> = self
            .entries
            .read()
            .iter()
            .map(|(id, e)| (*id, e.weight))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    pub fn statistics(&self) -> ReputationStats {
        let entries = self.entries.read();
        if entries.is_empty() {
            return ReputationStats::default();
        }
        let mut stats = ReputationStats {
            agents: entries.len(),
            mean_weight: 0.0,
            min_weight: f64::INFINITY,
            max_weight: f64::NEG_INFINITY,
            byzantine_agents: 0,
        };
        let mut sum = 0.0;
        for entry in entries.values() {
            sum += entry.weight;
            stats.min_weight = stats.min_weight.min(entry.weight);
            stats.max_weight = stats.max_weight.max(entry.weight);
            if entry.byzantine_faults > 0 {
                stats.byzantine_agents += 1;
            }
        }
        stats.mean_weight = sum / entries.len() as f64;
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn clamp(&self, weight: f64) -> f64 {
        weight.clamp(self.config.min_weight, self.config.max_weight)
    }
}

impl std::fmt::Debug for ReputationSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReputationSystem")
            .field("config", &self.config)
            .field("agents", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ManualTimeSource;

    fn system() -> (ReputationSystem, Arc<ManualTimeSource>) {
        let clock = Arc::new(ManualTimeSource::new(1_000));
        (
            ReputationSystem::new(ReputationConfig::default(), clock.clone()),
            clock,
        )
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_unknown_agent_gets_initial_weight() {
        let (rep, _) = system();
        assert!(close(rep.weight_of(&AgentId::new()), 1.0));
    }

    #[test]
    fn test_register_is_idempotent() {
        let (rep, _) = system();
        let a = AgentId::new();
        rep.register(a, 1.5);
        rep.register(a, 0.2);
        assert!(close(rep.weight_of(&a), 1.5));
    }

    #[test]
    fn test_apply_round_updates() {
        let (rep, clock) = system();
        let ids: Vec<AgentId> = (0..4).map(|_| AgentId::new()).collect();
        for id in &ids {
            rep.register(*id, 1.0);
        }
        clock.advance(500);
        rep.apply_round(&[
            (ids[0], RoundParticipation::Agreed),
            (ids[1], RoundParticipation::Disagreed),
            (ids[2], RoundParticipation::Silent),
            (ids[3], RoundParticipation::Byzantine),
        ]);
        assert!(close(rep.weight_of(&ids[0]), 1.01));
        assert!(close(rep.weight_of(&ids[1]), 0.99));
        assert!(close(rep.weight_of(&ids[2]), 0.98));
        assert!(close(rep.weight_of(&ids[3]), 0.5));

        let entry = rep.entry(&ids[3]).unwrap();
        assert_eq!(entry.byzantine_faults, 1);
        assert_eq!(entry.last_updated, 1_500);
        assert_eq!(rep.entry(&ids[0]).unwrap().accuracy(), 1.0);
    }

    #[test]
    fn test_weights_clamped() {
        let (rep, _) = system();
        let a = AgentId::new();
        let b = AgentId::new();
        rep.register(a, 1.99);
        rep.register(b, 0.15);
        rep.apply_round(&[
            (a, RoundParticipation::Agreed),
            (b, RoundParticipation::Byzantine),
        ]);
        assert!(close(rep.weight_of(&a), 2.0));
        assert!(close(rep.weight_of(&b), 0.1));
    }

    #[test]
    fn test_snapshot_unaffected_by_later_updates() {
        let (rep, _) = system();
        let a = AgentId::new();
        rep.register(a, 1.0);
        let snapshot = rep.snapshot(&[a]);
        rep.apply_round(&[(a, RoundParticipation::Byzantine)]);
        assert!(close(snapshot[0].weight, 1.0));
        assert!(close(rep.weight_of(&a), 0.5));
    }

    #[test]
    fn test_decay_pulls_toward_initial() {
        let (rep, _) = system();
        let a = AgentId::new();
        rep.register(a, 2.0);
        rep.apply_decay(Duration::from_secs(100));
        // 2.0 + (1.0 - 2.0) * 0.1
        assert!(close(rep.weight_of(&a), 1.9));
        rep.apply_decay(Duration::from_secs(10_000));
        assert!(close(rep.weight_of(&a), 1.0));
    }

    #[test]
    fn test_ranked_and_statistics() {
        let (rep, _) = system();
        let ids: Vec<AgentId> = (0..3).map(|_| AgentId::new()).collect();
        rep.register(ids[0], 0.5);
        rep.register(ids[1], 1.5);
        rep.register(ids[2], 1.0);
        rep.apply_round(&[(ids[0], RoundParticipation::Byzantine)]);

        let ranked = rep.ranked();
        assert_eq!(ranked[0].0, ids[1]);
        assert_eq!(ranked[2].0, ids[0]);

        let stats = rep.statistics();
        assert_eq!(stats.agents, 3);
        assert_eq!(stats.byzantine_agents, 1);
        assert!(close(stats.min_weight, 0.25));
        assert!(close(stats.max_weight, 1.5));
        assert!(close(stats.mean_weight, (0.25 + 1.5 + 1.0) / 3.0));
    }

    #[test]
    fn test_remove() {
        let (rep, _) = system();
        let a = AgentId::new();
        rep.register(a, 1.0);
        assert!(rep.remove(&a).is_some());
        assert!(rep.is_empty());
    }
}
