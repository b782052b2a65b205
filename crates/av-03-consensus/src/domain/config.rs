//! Consensus and reputation tunables.

use super::errors::ConsensusError;
use super::quorum::DEFAULT_QUORUM_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reputation update parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Weight assigned when an agent has no entry yet.
    pub initial_weight: f64,
    pub min_weight: f64,
    pub max_weight: f64,
    /// Agreeing voters gain `weight * learning_rate`, dissenters lose it.
    pub learning_rate: f64,
    /// Multiplicative loss for participants that never voted.
    pub timeout_penalty: f64,
    /// Byzantine agents' weight is multiplied by this.
    pub byzantine_factor: f64,
    /// Per-second pull of idle weights back toward `initial_weight`.
    pub decay_rate: f64,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            initial_weight: 1.0,
            min_weight: 0.1,
            max_weight: 2.0,
            learning_rate: 0.01,
            timeout_penalty: 0.02,
            byzantine_factor: 0.5,
            decay_rate: 0.001,
        }
    }
}

impl ReputationConfig {
    pub fn validate(&self) -> Result<(), ConsensusError> {
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(ConsensusError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {v}"
                )))
            }
        };
        if !(self.min_weight >= 0.0 && self.min_weight <= self.max_weight) {
            return Err(ConsensusError::InvalidConfig(
                "require 0 <= min_weight <= max_weight".into(),
            ));
        }
        unit("learning_rate", self.learning_rate)?;
        unit("timeout_penalty", self.timeout_penalty)?;
        unit("decay_rate", self.decay_rate)?;
        if !(self.byzantine_factor >= 0.0 && self.byzantine_factor < 1.0) {
            return Err(ConsensusError::InvalidConfig(
                "byzantine_factor must be in [0, 1)".into(),
            ));
        }
        Ok(())
    }
}

/// Protocol parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Fraction of total possible weight needed for a phase quorum.
    pub quorum_threshold: f64,
    /// Requesters must hold strictly more than this fraction to force a view change.
    pub view_change_threshold: f64,
    /// How long replicas wait for the primary's pre-prepare.
    pub pre_prepare_timeout: Duration,
    /// Bound on each of the prepare and commit phases.
    pub phase_timeout: Duration,
    /// After commit quorum, how long to keep collecting late commit votes.
    pub commit_linger: Duration,
    /// View changes allowed before the round times out.
    pub max_view_changes: u32,
    pub reputation: ReputationConfig,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            quorum_threshold: DEFAULT_QUORUM_THRESHOLD,
            view_change_threshold: 1.0 / 3.0,
            pre_prepare_timeout: Duration::from_millis(500),
            phase_timeout: Duration::from_secs(1),
            commit_linger: Duration::from_millis(50),
            max_view_changes: 3,
            reputation: ReputationConfig::default(),
        }
    }
}

impl ConsensusConfig {
    pub fn validate(&self) -> Result<(), ConsensusError> {
        if !(self.quorum_threshold > 0.5 && self.quorum_threshold <= 1.0) {
            return Err(ConsensusError::InvalidConfig(format!(
                "quorum_threshold must be in (0.5, 1], got {}",
                self.quorum_threshold
            )));
        }
        if !(self.view_change_threshold > 0.0 && self.view_change_threshold < 1.0) {
            return Err(ConsensusError::InvalidConfig(
                "view_change_threshold must be in (0, 1)".into(),
            ));
        }
        if self.pre_prepare_timeout.is_zero() || self.phase_timeout.is_zero() {
            return Err(ConsensusError::InvalidConfig(
                "timeouts must be non-zero".into(),
            ));
        }
        self.reputation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        assert!(ConsensusConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_minority_quorum() {
        let config = ConsensusConfig {
            quorum_threshold: 0.5,
            ..ConsensusConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_reputation_bounds() {
        let mut config = ConsensusConfig::default();
        config.reputation.min_weight = 3.0;
        assert!(config.validate().is_err());
    }
}
