//! # Agent Health
//!
//! Per-agent health state machine driven by probe outcomes.
//!
//! ```text
//! [HEALTHY] ──slow probe──→ [DEGRADED]
//!     ↑  ↑                      │
//!     │  └──── fast probe ──────┘
//!     │
//!     │         failed probe (from any state)
//!     │                 ↓
//!     └── any success ── [UNREACHABLE {failures: n}] ──n >= threshold──→ evict
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HealthStatus {
    #[default]
    Healthy,
    /// Slow or erratic but usable.
    Degraded,
    /// Excluded from new rounds until a probe succeeds.
    Unreachable,
}

impl HealthStatus {
    pub fn is_usable(self) -> bool {
        !matches!(self, HealthStatus::Unreachable)
    }
}

/// Thresholds applied to probe results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthPolicy {
    /// Probes slower than this mark the agent degraded.
    pub degraded_latency: Duration,
    /// Consecutive failed probes before the agent is evicted.
    pub eviction_threshold: u32,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            degraded_latency: Duration::from_millis(50),
            eviction_threshold: 3,
        }
    }
}

/// Result of one liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Responded(Duration),
    Failed,
}

/// Health state machine for one agent.
#[derive(Debug, Default)]
pub struct HealthTracker {
    status: HealthStatus,
    consecutive_failures: u32,
    /// Successful probes only.
    probes: u64,
    total_latency: Duration,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Mean latency of successful probes.
    pub fn average_latency(&self) -> Duration {
        if self.probes == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total_latency.as_nanos() / u128::from(self.probes);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Apply a probe outcome and return the new status.
    pub fn record(&mut self, outcome: ProbeOutcome, policy: &HealthPolicy) -> HealthStatus {
        self.status = Self::next_status(outcome, policy);
        match outcome {
            ProbeOutcome::Responded(latency) => {
                self.consecutive_failures = 0;
                self.probes += 1;
                self.total_latency = self.total_latency.saturating_add(latency);
            }
            ProbeOutcome::Failed => self.consecutive_failures += 1,
        }
        self.status
    }

    /// Pure transition function; the previous state does not matter.
    fn next_status(outcome: ProbeOutcome, policy: &HealthPolicy) -> HealthStatus {
        match outcome {
            ProbeOutcome::Responded(latency) if latency > policy.degraded_latency => {
                HealthStatus::Degraded
            }
            ProbeOutcome::Responded(_) => HealthStatus::Healthy,
            ProbeOutcome::Failed => HealthStatus::Unreachable,
        }
    }

    pub fn should_evict(&self, policy: &HealthPolicy) -> bool {
        self.consecutive_failures >= policy.eviction_threshold
    }
}
