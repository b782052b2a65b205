//! # Agent
//!
//! A verifier identity plus the state the pool tracks about it.

use super::behavior::AgentBehavior;
use super::health::{HealthPolicy, HealthStatus, HealthTracker, ProbeOutcome};
use av_01_signature_verification::SignatureManager;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use shared_crypto::{Ed25519PublicKey, Identity};
use shared_types::{AgentId, AgentRole, Verdict};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

const PROBE_MESSAGE: &[u8] = b"av-agent-health-probe";

/// What agents are asked to judge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proposition {
    /// Does `signature` verify `message` under `public_key`?
    Signature {
        public_key: Vec<u8>,
        message: Vec<u8>,
        signature: Vec<u8>,
    },
    /// A caller-supplied verdict to agree on.
    Value(Verdict),
}

/// An agent's own judgement of a proposition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalVerdict {
    pub verdict: Verdict,
    /// 1.0 when the verdict came from a completed verification.
    pub confidence: f64,
}

/// Running counters for one agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    pub evaluations: u64,
    pub valid: u64,
    pub invalid: u64,
    pub errors: u64,
    pub total_response_time: Duration,
}

impl AgentStats {
    pub fn average_response_time(&self) -> Duration {
        if self.evaluations == 0 {
            return Duration::ZERO;
        }
        self.total_response_time / self.evaluations as u32
    }
}

/// A pool member.
pub struct Agent {
    id: AgentId,
    identity: Identity,
    role: AgentRole,
    initial_weight: f64,
    behavior: RwLock<AgentBehavior>,
    health: Mutex<HealthTracker>,
    stats: Mutex<AgentStats>,
    verifier: Arc<SignatureManager>,
}

impl Agent {
    pub fn new(
        identity: Identity,
        role: AgentRole,
        initial_weight: f64,
        verifier: Arc<SignatureManager>,
    ) -> Self {
        Self {
            id: AgentId::new(),
            identity,
            role,
            initial_weight,
            behavior: RwLock::new(AgentBehavior::Honest),
            health: Mutex::new(HealthTracker::new()),
            stats: Mutex::new(AgentStats::default()),
            verifier,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn did(&self) -> &str {
        self.identity.did()
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.identity.public_key()
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn initial_weight(&self) -> f64 {
        self.initial_weight
    }

    pub fn behavior(&self) -> AgentBehavior {
        *self.behavior.read()
    }

    pub fn set_behavior(&self, behavior: AgentBehavior) {
        *self.behavior.write() = behavior;
    }

    pub fn health(&self) -> HealthStatus {
        self.health.lock().status()
    }

    pub fn stats(&self) -> AgentStats {
        self.stats.lock().clone()
    }

    /// Judge a proposition through the shared cache.
    ///
    /// The reported verdict reflects the agent's behaviour: an `Inverting`
    /// agent reports the opposite of what it computed.
    pub fn evaluate(&self, proposition: &Proposition) -> LocalVerdict {
        let start = Instant::now();
        let (verdict, confidence, errored) = match proposition {
            Proposition::Signature {
                public_key,
                message,
                signature,
            } => match self.verifier.verify(public_key, message, signature) {
                Ok(outcome) => (Verdict::from_bool(outcome.valid), 1.0, false),
                Err(_) => (Verdict::Invalid, 0.0, true),
            },
            Proposition::Value(v) => (*v, 1.0, false),
        };

        let mut stats = self.stats.lock();
        stats.evaluations += 1;
        stats.total_response_time += start.elapsed();
        if errored {
            stats.errors += 1;
        } else if verdict.is_valid() {
            stats.valid += 1;
        } else {
            stats.invalid += 1;
        }
        drop(stats);

        let verdict = match self.behavior() {
            AgentBehavior::Inverting => verdict.inverted(),
            _ => verdict,
        };
        trace!(agent = %self.id, %verdict, "evaluated proposition");
        LocalVerdict {
            verdict,
            confidence,
        }
    }

    /// Sign-and-verify self test, timed.
    fn run_probe(&self) -> ProbeOutcome {
        if !self.behavior().responds() {
            return ProbeOutcome::Failed;
        }
        let start = Instant::now();
        match self.identity.sign(PROBE_MESSAGE) {
            Ok(sig) if self.identity.verify(PROBE_MESSAGE, &sig) => {
                ProbeOutcome::Responded(start.elapsed())
            }
            _ => ProbeOutcome::Failed,
        }
    }

    /// Run a liveness probe and update the health state.
    ///
    /// Returns the new status and whether the agent should be evicted.
    pub fn probe(&self, policy: &HealthPolicy) -> (HealthStatus, bool) {
        let outcome = self.run_probe();
        let mut health = self.health.lock();
        let status = health.record(outcome, policy);
        (status, health.should_evict(policy))
    }

    /// Average latency of successful probes.
    pub fn probe_latency(&self) -> Duration {
        self.health.lock().average_latency()
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("did", &self.identity.did())
            .field("role", &self.role)
            .field("behavior", &self.behavior())
            .field("health", &self.health())
            .finish()
    }
}
