//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `AgentId`, `AgentRole`
//! - **Consensus**: `RoundId`, `Verdict`
//! - **Lifecycle**: `PoolHandle`

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier for an agent in a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First group is enough to tell agents apart in logs.
        let s = self.0.to_string();
        write!(f, "agent-{}", &s[..8])
    }
}

/// Identifier of a single consensus round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundId(pub Uuid);

impl RoundId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoundId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to an agent pool owned by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolHandle(pub Uuid);

impl PoolHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PoolHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool-{}", self.0)
    }
}

/// Role an agent plays in its pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AgentRole {
    #[default]
    Verifier,
    Coordinator,
}

// =============================================================================
// VERDICT
// =============================================================================

/// The value agents reach agreement on: whether a signature verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Valid,
    Invalid,
}

impl Verdict {
    pub fn from_bool(valid: bool) -> Self {
        if valid {
            Verdict::Valid
        } else {
            Verdict::Invalid
        }
    }

    pub fn is_valid(self) -> bool {
        matches!(self, Verdict::Valid)
    }

    /// The opposite verdict.
    pub fn inverted(self) -> Self {
        match self {
            Verdict::Valid => Verdict::Invalid,
            Verdict::Invalid => Verdict::Valid,
        }
    }

    /// Canonical single-byte encoding. Vote matching compares these bytes.
    pub fn canonical_byte(self) -> u8 {
        match self {
            Verdict::Valid => 0x01,
            Verdict::Invalid => 0x00,
        }
    }

    pub fn from_canonical_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Verdict::Valid),
            0x00 => Some(Verdict::Invalid),
            _ => None,
        }
    }
}

impl From<bool> for Verdict {
    fn from(valid: bool) -> Self {
        Verdict::from_bool(valid)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Valid => write!(f, "valid"),
            Verdict::Invalid => write!(f, "invalid"),
        }
    }
}
