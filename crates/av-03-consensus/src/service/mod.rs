//! # Consensus Service
//!
//! Async driver around [`BftRound`]. One call runs one round:
//!
//! 1. Snapshot usable participants and their reputation weights.
//! 2. Spawn one replica task per participant.
//! 3. Drive PrePrepare → Prepare → Commit, bounding every wait with the
//!    pre-prepare or phase timeout; time out into view changes.
//! 4. After commit, linger briefly for late commit votes.
//! 5. Update reputation, emit a [`ConsensusDecision`], return the result.
//!
//! Every wait is raced against the caller's [`CancelHandle`].

mod cancel;
mod replica;


pub use cancel::CancelHandle;

use crate::domain::{
    has_quorum, BftRound, ConsensusConfig, ConsensusDecision, ConsensusError, ConsensusResult,
    ConsensusStatus, Progress, ReputationSystem, RoundParams, Tally, ViewChangeReason,
};
use crate::metrics;
use crate::ports::{ConsensusApi, DecisionSink};
use async_trait::async_trait;
use av_02_agent_pool::{AgentPool, AgentPoolApi, Proposition};
use replica::{FromReplica, Replica, ToReplica};
use shared_crypto::{CryptoError, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use shared_types::{AgentId, RoundId, SystemTimeSource, TimeSource, Verdict};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, trace, warn};

/// Consensus service over one agent pool.
pub struct ConsensusService<D: DecisionSink> {
    pool: Arc<AgentPool>,
    reputation: Arc<ReputationSystem>,
    sink: Arc<D>,
    config: ConsensusConfig,
    time_source: Arc<dyn TimeSource>,
}

impl<D: DecisionSink> ConsensusService<D> {
    pub fn new(
        pool: Arc<AgentPool>,
        sink: Arc<D>,
        config: ConsensusConfig,
    ) -> Result<Self, ConsensusError> {
        Self::with_time_source(pool, sink, config, Arc::new(SystemTimeSource))
    }

    /// Create with a custom time source (for testing).
    pub fn with_time_source(
        pool: Arc<AgentPool>,
        sink: Arc<D>,
        config: ConsensusConfig,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, ConsensusError> {
        config.validate()?;
        let reputation = Arc::new(ReputationSystem::new(
            config.reputation.clone(),
            time_source.clone(),
        ));
        Ok(Self {
            pool,
            reputation,
            sink,
            config,
            time_source,
        })
    }

    pub fn pool(&self) -> &Arc<AgentPool> {
        &self.pool
    }

    pub fn reputation(&self) -> &Arc<ReputationSystem> {
        &self.reputation
    }

    pub fn sink(&self) -> &Arc<D> {
        &self.sink
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    async fn run_round(
        &self,
        proposition: Proposition,
        cancel: CancelHandle,
    ) -> Result<ConsensusResult, ConsensusError> {
        if self.pool.is_empty() {
            return Err(ConsensusError::EmptyPool);
        }
        let started = Instant::now();
        let round_id = RoundId::new();
        let bft_safe = self.pool.is_bft_safe();

        for agent in self.pool.agents() {
            self.reputation.register(agent.id(), agent.initial_weight());
        }
        let pool_weight: f64 = self
            .pool
            .agents()
            .iter()
            .map(|a| self.reputation.weight_of(&a.id()))
            .sum();
        let agents = self.pool.participants();
        let ids: Vec<AgentId> = agents.iter().map(|a| a.id()).collect();
        let snapshot = self.reputation.snapshot(&ids);
        let usable = Tally {
            for_weight: snapshot.iter().map(|p| p.weight).sum(),
            ..Tally::default()
        };

        if snapshot.is_empty() || !has_quorum(&usable, pool_weight, self.config.quorum_threshold)
        {
            warn!(
                %round_id,
                usable = usable.for_weight,
                pool_weight,
                "not enough usable weight to reach quorum"
            );
            let result = ConsensusResult::insufficient(round_id, ids, usable.for_weight, bft_safe);
            self.finish(&result, started).await;
            return Ok(result);
        }

        let mut round = BftRound::new(
            round_id,
            snapshot,
            RoundParams::from(&self.config),
            self.pool.topology(),
        )?;
        debug!(%round_id, participants = agents.len(), bft_safe, "round started");

        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let proposition = Arc::new(proposition);
        let mut inboxes = HashMap::with_capacity(agents.len());
        let mut replicas = JoinSet::new();
        for agent in agents {
            let (tx, rx) = mpsc::unbounded_channel();
            inboxes.insert(agent.id(), tx);
            replicas.spawn(Replica::new(agent, proposition.clone(), rx, out_tx.clone()).run());
        }
        drop(out_tx);

        let cancelled = tokio::select! {
            biased;
            _ = cancel.cancelled() => true,
            _ = self.drive(&mut round, &inboxes, &mut out_rx) => false,
        };
        if cancelled {
            round.abort();
            info!(%round_id, view = round.view(), "round cancelled");
        }

        drop(inboxes);
        replicas.shutdown().await;

        let result = round.result(bft_safe);
        if matches!(
            result.status,
            ConsensusStatus::Committed | ConsensusStatus::Timeout
        ) {
            self.reputation.apply_round(&round.participations());
        }
        self.finish(&result, started).await;
        Ok(result)
    }

    /// Run views until the round commits or exhausts its view changes.
    async fn drive(
        &self,
        round: &mut BftRound,
        inboxes: &HashMap<AgentId, UnboundedSender<ToReplica>>,
        rx: &mut UnboundedReceiver<FromReplica>,
    ) {
        'views: loop {
            let view = round.view();
            let recipients: Vec<AgentId> = round.participants().iter().map(|p| p.agent_id).collect();
            send(
                inboxes,
                round.primary(),
                ToReplica::Propose { view, recipients },
            );

            let mut deadline = Instant::now() + self.config.pre_prepare_timeout;
            let mut on_expiry = ViewChangeReason::PrePrepareTimeout;

            loop {
                let (progress, reason) = match timeout_at(deadline, rx.recv()).await {
                    Ok(Some(message)) => match self.apply(round, message) {
                        Some(step) => step,
                        None => continue,
                    },
                    Ok(None) => {
                        tokio::time::sleep_until(deadline).await;
                        (round.on_timeout(on_expiry), on_expiry)
                    }
                    Err(_) => (round.on_timeout(on_expiry), on_expiry),
                };

                match progress {
                    Progress::Accepted { deliveries } => {
                        for (agent, value) in deliveries {
                            send(inboxes, agent, ToReplica::PrePrepare { view, value });
                        }
                        deadline = Instant::now() + self.config.phase_timeout;
                        on_expiry = ViewChangeReason::PhaseTimeout;
                    }
                    Progress::Prepared(value) => {
                        for agent in inboxes.keys() {
                            send(inboxes, *agent, ToReplica::Prepared { view, value });
                        }
                        deadline = Instant::now() + self.config.phase_timeout;
                    }
                    Progress::Committed(_) => {
                        self.linger(round, rx).await;
                        return;
                    }
                    Progress::ViewChanged { view, primary } => {
                        metrics::record_view_change(reason.as_str());
                        debug!(round_id = %round.round_id(), view, %primary, "moving to next view");
                        continue 'views;
                    }
                    Progress::TimedOut => return,
                    Progress::Recorded | Progress::Duplicate => {}
                }
            }
        }
    }

    /// Feed one replica message to the round. `None` for rejected input.
    fn apply(
        &self,
        round: &mut BftRound,
        message: FromReplica,
    ) -> Option<(Progress, ViewChangeReason)> {
        let outcome = match message {
            FromReplica::PrePrepare {
                view,
                from,
                proposals,
            } => round
                .on_pre_prepare(from, view, proposals)
                .map(|p| (p, ViewChangeReason::ConflictingProposals)),
            FromReplica::Vote {
                agent,
                view,
                phase,
                value,
            } => round
                .cast_vote(agent, view, phase, value, self.time_source.now())
                .map(|p| (p, ViewChangeReason::PhaseTimeout)),
            FromReplica::ViewChangeRequest { agent, view } => round
                .on_view_change_request(agent, view)
                .map(|p| (p, ViewChangeReason::Requested)),
        };
        match outcome {
            Ok(step) => Some(step),
            Err(reject) => {
                trace!(round_id = %round.round_id(), %reject, "message rejected");
                None
            }
        }
    }

    /// Collect late commit votes until every honest participant has voted
    /// or `commit_linger` elapses.
    async fn linger(&self, round: &mut BftRound, rx: &mut UnboundedReceiver<FromReplica>) {
        let deadline = Instant::now() + self.config.commit_linger;
        while !round.all_honest_committed() {
            match timeout_at(deadline, rx.recv()).await {
                Ok(Some(message @ FromReplica::Vote { .. })) => {
                    self.apply(round, message);
                }
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => break,
            }
        }
    }

    async fn finish(&self, result: &ConsensusResult, started: Instant) {
        metrics::record_round(
            result.status.as_str(),
            started.elapsed().as_secs_f64(),
            result.byzantine_agents_detected.len(),
        );
        info!(
            round_id = %result.round_id,
            status = result.status.as_str(),
            verified = result.verified,
            votes_for = result.votes_for,
            votes_against = result.votes_against,
            total_weight = result.total_weight,
            view = result.view,
            byzantine = result.byzantine_agents_detected.len(),
            "round finished"
        );
        let decision = ConsensusDecision::from_result(result, self.time_source.now());
        if let Err(e) = self.sink.record(decision).await {
            warn!(round_id = %result.round_id, error = %e, "failed to record decision");
        }
    }
}

fn send(inboxes: &HashMap<AgentId, UnboundedSender<ToReplica>>, to: AgentId, message: ToReplica) {
    if let Some(inbox) = inboxes.get(&to) {
        // A replica that has exited simply misses the message.
        let _ = inbox.send(message);
    }
}

#[async_trait]
impl<D: DecisionSink> ConsensusApi for ConsensusService<D> {
    async fn verify_with_consensus(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<ConsensusResult, ConsensusError> {
        if public_key.len() != PUBLIC_KEY_LENGTH {
            return Err(CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_LENGTH,
                actual: public_key.len(),
            }
            .into());
        }
        if signature.len() != SIGNATURE_LENGTH {
            return Err(CryptoError::InvalidSignatureLength {
                expected: SIGNATURE_LENGTH,
                actual: signature.len(),
            }
            .into());
        }
        let proposition = Proposition::Signature {
            public_key: public_key.to_vec(),
            message: message.to_vec(),
            signature: signature.to_vec(),
        };
        self.run_round(proposition, CancelHandle::new()).await
    }

    async fn propose_and_vote(&self, value: Verdict) -> Result<ConsensusResult, ConsensusError> {
        self.run_round(Proposition::Value(value), CancelHandle::new())
            .await
    }

    async fn run(
        &self,
        proposition: Proposition,
        cancel: CancelHandle,
    ) -> Result<ConsensusResult, ConsensusError> {
        self.run_round(proposition, cancel).await
    }
}
