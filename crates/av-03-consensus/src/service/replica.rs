//! In-process replica tasks.
//!
//! Each participant runs as its own tokio task. It evaluates the
//! proposition once, then reacts to the driver's messages according to its
//! fault behaviour:
//!
//! | Behaviour     | Propose (primary)        | PrePrepare                       | Prepared                 |
//! |---------------|--------------------------|----------------------------------|--------------------------|
//! | Honest        | belief to everyone       | prepare if it matches, else ask for view change | commit if it matches |
//! | SilentPrimary | nothing                  | as Honest                        | as Honest                |
//! | Crashed       | nothing                  | nothing                          | nothing                  |
//! | Equivocating  | alternating values       | prepare both values              | commit both values       |
//! | Inverting     | inverted belief          | prepare inverted belief          | commit inverted belief   |
//!
//! Inverting agents already report the inverted verdict from
//! [`Agent::evaluate`], so their "belief" here is the inverted one.

use crate::domain::Phase;
use av_02_agent_pool::{Agent, AgentBehavior, Proposition};
use shared_types::{AgentId, Verdict};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::trace;

/// Driver to replica.
#[derive(Debug, Clone)]
pub(crate) enum ToReplica {
    /// Sent to the primary of `view`.
    Propose { view: u64, recipients: Vec<AgentId> },
    PrePrepare { view: u64, value: Verdict },
    Prepared { view: u64, value: Verdict },
}

/// Replica to driver.
#[derive(Debug, Clone)]
pub(crate) enum FromReplica {
    PrePrepare {
        view: u64,
        from: AgentId,
        proposals: Vec<(AgentId, Verdict)>,
    },
    Vote {
        agent: AgentId,
        view: u64,
        phase: Phase,
        value: Verdict,
    },
    ViewChangeRequest { agent: AgentId, view: u64 },
}

pub(crate) struct Replica {
    agent: Arc<Agent>,
    proposition: Arc<Proposition>,
    inbox: UnboundedReceiver<ToReplica>,
    outbox: UnboundedSender<FromReplica>,
}

impl Replica {
    pub(crate) fn new(
        agent: Arc<Agent>,
        proposition: Arc<Proposition>,
        inbox: UnboundedReceiver<ToReplica>,
        outbox: UnboundedSender<FromReplica>,
    ) -> Self {
        Self {
            agent,
            proposition,
            inbox,
            outbox,
        }
    }

    /// Serve driver messages until the inbox closes or the driver is gone.
    pub(crate) async fn run(mut self) {
        let behavior = self.agent.behavior();
        if !behavior.responds() {
            // Drain so the driver never sees a closed channel.
            while self.inbox.recv().await.is_some() {}
            return;
        }
        let belief = self.agent.evaluate(&self.proposition).verdict;
        let id = self.agent.id();

        while let Some(message) = self.inbox.recv().await {
            trace!(agent_id = %id, ?message, "replica received");
            let replies = respond(id, behavior, belief, message);
            for reply in replies {
                if self.outbox.send(reply).is_err() {
                    return;
                }
            }
        }
    }
}

/// Messages a replica sends in answer to one driver message.
fn respond(
    id: AgentId,
    behavior: AgentBehavior,
    belief: Verdict,
    message: ToReplica,
) -> Vec<FromReplica> {
    let vote = |view, phase, value| FromReplica::Vote {
        agent: id,
        view,
        phase,
        value,
    };
    match (behavior, message) {
        (AgentBehavior::Crashed, _) | (AgentBehavior::SilentPrimary, ToReplica::Propose { .. }) => {
            Vec::new()
        }
        (AgentBehavior::Equivocating, ToReplica::Propose { view, recipients }) => {
            let proposals = recipients
                .into_iter()
                .enumerate()
                .map(|(i, r)| {
                    let value = if i % 2 == 0 { belief } else { belief.inverted() };
                    (r, value)
                })
                .collect();
            vec![FromReplica::PrePrepare {
                view,
                from: id,
                proposals,
            }]
        }
        (_, ToReplica::Propose { view, recipients }) => vec![FromReplica::PrePrepare {
            view,
            from: id,
            proposals: recipients.into_iter().map(|r| (r, belief)).collect(),
        }],
        (AgentBehavior::Equivocating, ToReplica::PrePrepare { view, .. }) => vec![
            vote(view, Phase::Prepare, belief),
            vote(view, Phase::Prepare, belief.inverted()),
        ],
        (AgentBehavior::Equivocating, ToReplica::Prepared { view, .. }) => vec![
            vote(view, Phase::Commit, belief),
            vote(view, Phase::Commit, belief.inverted()),
        ],
        (AgentBehavior::Inverting, ToReplica::PrePrepare { view, .. }) => {
            vec![vote(view, Phase::Prepare, belief)]
        }
        (AgentBehavior::Inverting, ToReplica::Prepared { view, .. }) => {
            vec![vote(view, Phase::Commit, belief)]
        }
        (_, ToReplica::PrePrepare { view, value }) => {
            if value == belief {
                vec![vote(view, Phase::Prepare, value)]
            } else {
                vec![FromReplica::ViewChangeRequest { agent: id, view }]
            }
        }
        (_, ToReplica::Prepared { view, value }) => {
            if value == belief {
                vec![vote(view, Phase::Commit, value)]
            } else {
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn votes(replies: &[FromReplica]) -> Vec<(Phase, Verdict)> {
        replies
            .iter()
            .filter_map(|r| match r {
                FromReplica::Vote { phase, value, .. } => Some((*phase, *value)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_honest_prepares_matching_value() {
        let id = AgentId::new();
        let replies = respond(
            id,
            AgentBehavior::Honest,
            Verdict::Valid,
            ToReplica::PrePrepare {
                view: 0,
                value: Verdict::Valid,
            },
        );
        assert_eq!(votes(&replies), vec![(Phase::Prepare, Verdict::Valid)]);
    }

    #[test]
    fn test_honest_requests_view_change_on_mismatch() {
        let id = AgentId::new();
        let replies = respond(
            id,
            AgentBehavior::Honest,
            Verdict::Valid,
            ToReplica::PrePrepare {
                view: 2,
                value: Verdict::Invalid,
            },
        );
        assert!(matches!(
            replies.as_slice(),
            [FromReplica::ViewChangeRequest { view: 2, .. }]
        ));
    }

    #[test]
    fn test_silent_primary_never_proposes() {
        let replies = respond(
            AgentId::new(),
            AgentBehavior::SilentPrimary,
            Verdict::Valid,
            ToReplica::Propose {
                view: 0,
                recipients: vec![AgentId::new()],
            },
        );
        assert!(replies.is_empty());
    }

    #[test]
    fn test_equivocating_primary_alternates() {
        let recipients: Vec<AgentId> = (0..4).map(|_| AgentId::new()).collect();
        let replies = respond(
            AgentId::new(),
            AgentBehavior::Equivocating,
            Verdict::Valid,
            ToReplica::Propose {
                view: 0,
                recipients: recipients.clone(),
            },
        );
        match &replies[..] {
            [FromReplica::PrePrepare { proposals, .. }] => {
                assert_eq!(proposals[0], (recipients[0], Verdict::Valid));
                assert_eq!(proposals[1], (recipients[1], Verdict::Invalid));
            }
            other => panic!("unexpected replies {other:?}"),
        }
    }

    #[test]
    fn test_equivocating_replica_votes_both_ways() {
        let replies = respond(
            AgentId::new(),
            AgentBehavior::Equivocating,
            Verdict::Valid,
            ToReplica::Prepared {
                view: 0,
                value: Verdict::Valid,
            },
        );
        assert_eq!(
            votes(&replies),
            vec![
                (Phase::Commit, Verdict::Valid),
                (Phase::Commit, Verdict::Invalid)
            ]
        );
    }

    #[test]
    fn test_inverting_votes_its_belief_regardless() {
        let replies = respond(
            AgentId::new(),
            AgentBehavior::Inverting,
            Verdict::Invalid,
            ToReplica::PrePrepare {
                view: 0,
                value: Verdict::Valid,
            },
        );
        assert_eq!(votes(&replies), vec![(Phase::Prepare, Verdict::Invalid)]);
    }
}
