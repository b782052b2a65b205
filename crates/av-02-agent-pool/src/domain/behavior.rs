//! Fault behaviours.
//!
//! Agents run in-process, so Byzantine and crash faults are injected by
//! tagging an agent with a behaviour the consensus replicas act out.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AgentBehavior {
    /// Follows the protocol.
    #[default]
    Honest,
    /// Never responds; fails health probes.
    Crashed,
    /// Follows the protocol except it never proposes as primary.
    SilentPrimary,
    /// Sends conflicting proposals as primary and votes both ways as replica.
    Equivocating,
    /// Reports the opposite of its real verdict, consistently.
    Inverting,
}

impl AgentBehavior {
    /// Deviates from the protocol (as opposed to crashing or staying silent).
    pub fn is_byzantine(self) -> bool {
        matches!(self, AgentBehavior::Equivocating | AgentBehavior::Inverting)
    }

    pub fn responds(self) -> bool {
        !matches!(self, AgentBehavior::Crashed)
    }
}
