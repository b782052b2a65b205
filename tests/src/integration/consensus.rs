//! # Consensus Scenarios
//!
//! PBFT rounds through the facade: honest pools, tolerated and
//! intolerable Byzantine fractions, view changes.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{signed, system};
    use av_02_agent_pool::{AgentBehavior, AgentPoolApi, Topology};
    use av_03_consensus::{ByzantineEvidence, ConsensusStatus};
    use av_runtime::VerificationSystem;
    use shared_types::{AgentId, PoolHandle, Verdict};

    /// Spawn a pool of `n` and apply behaviours by spawn index.
    fn pool_with(
        system: &VerificationSystem,
        n: usize,
        topology: Topology,
        faults: &[(usize, AgentBehavior)],
    ) -> (PoolHandle, Vec<AgentId>) {
        let handle = system.spawn_pool(n, topology).unwrap();
        let pool = system.pool(handle).unwrap();
        let ids: Vec<AgentId> = pool.agents().iter().map(|a| a.id()).collect();
        for (index, behavior) in faults {
            pool.set_behavior(ids[*index], *behavior).unwrap();
        }
        (handle, ids)
    }

    // =========================================================================
    // HONEST POOLS
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_four_honest_agents_commit_valid_signature() {
        let system = system();
        let (handle, ids) = pool_with(&system, 4, Topology::Mesh, &[]);
        let (pk, sig) = signed(b"pay 5 to carol");

        let result = system
            .verify_with_consensus(b"pay 5 to carol", &sig, &pk, handle)
            .await
            .unwrap();

        assert_eq!(result.status, ConsensusStatus::Committed);
        assert!(result.verified);
        assert_eq!(result.votes_for, 4.0);
        assert_eq!(result.total_weight, 4.0);
        assert!(result.byzantine_agents_detected.is_empty());
        assert_eq!(result.participating_agents.len(), 4);

        let reputation = system.reputation(handle).unwrap();
        for id in &ids {
            assert!((reputation.weight_of(id) - 1.01).abs() < 1e-9);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_forged_signature_commits_invalid_not_timeout() {
        let system = system();
        let (handle, _) = pool_with(&system, 4, Topology::Ring, &[]);
        let (pk, sig) = signed(b"original");

        let result = system
            .verify_with_consensus(b"forged", &sig, &pk, handle)
            .await
            .unwrap();

        assert_eq!(result.status, ConsensusStatus::Committed);
        assert_eq!(result.value, Some(Verdict::Invalid));
        assert!(!result.verified);
    }

    #[tokio::test(start_paused = true)]
    async fn test_larger_pool_commits_under_every_topology() {
        for topology in [
            Topology::Mesh,
            Topology::Ring,
            Topology::Star,
            Topology::Hierarchical { fanout: 3 },
        ] {
            let system = system();
            let (handle, _) = pool_with(&system, 7, topology, &[]);
            let result = system.propose_and_vote(Verdict::Valid, handle).await.unwrap();
            assert!(result.is_committed(), "{topology:?}");
            assert_eq!(result.votes_for, 7.0);
        }
    }

    // =========================================================================
    // BYZANTINE FRACTION <= 1/3
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_equivocator_flagged_and_quorum_recomputed() {
        let system = system();
        let (handle, ids) = pool_with(&system, 4, Topology::Mesh, &[(2, AgentBehavior::Equivocating)]);
        let (pk, sig) = signed(b"double vote");

        let result = system
            .verify_with_consensus(b"double vote", &sig, &pk, handle)
            .await
            .unwrap();

        assert_eq!(result.status, ConsensusStatus::Committed);
        assert!(result.verified);
        assert_eq!(result.votes_for, 3.0);
        assert_eq!(result.total_weight, 3.0);
        assert_eq!(result.byzantine_agents_detected, vec![ids[2]]);
        assert!(result
            .evidence
            .iter()
            .all(|e| e.agent_id() == ids[2]));

        let reputation = system.reputation(handle).unwrap();
        assert!((reputation.weight_of(&ids[2]) - 0.5).abs() < 1e-9);
        assert_eq!(reputation.entry(&ids[2]).unwrap().byzantine_faults, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_faults_in_seven_tolerated() {
        let system = system();
        let (handle, ids) = pool_with(
            &system,
            7,
            Topology::Mesh,
            &[(5, AgentBehavior::Inverting), (6, AgentBehavior::Inverting)],
        );

        let result = system.propose_and_vote(Verdict::Valid, handle).await.unwrap();

        assert_eq!(result.status, ConsensusStatus::Committed);
        assert_eq!(result.value, Some(Verdict::Valid));
        assert_eq!(result.votes_for, 5.0);
        assert_eq!(result.votes_against, 2.0);
        assert!(result.bft_safe);
        let reputation = system.reputation(handle).unwrap();
        assert!(reputation.weight_of(&ids[5]) < reputation.weight_of(&ids[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_crashed_agent_loses_weight_for_silence() {
        let system = system();
        let (handle, ids) = pool_with(&system, 4, Topology::Mesh, &[(1, AgentBehavior::Crashed)]);

        let result = system.propose_and_vote(Verdict::Valid, handle).await.unwrap();

        assert!(result.is_committed());
        assert_eq!(result.votes_for, 3.0);
        let entry = system.reputation(handle).unwrap().entry(&ids[1]).unwrap();
        assert_eq!(entry.timeouts, 1);
        assert!((entry.weight - 0.98).abs() < 1e-9);
    }

    // =========================================================================
    // VIEW CHANGE
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_silent_primary_replaced_by_next_agent() {
        let system = system();
        let (handle, _) = pool_with(&system, 4, Topology::Mesh, &[(0, AgentBehavior::SilentPrimary)]);
        let (pk, sig) = signed(b"view change");

        let result = system
            .verify_with_consensus(b"view change", &sig, &pk, handle)
            .await
            .unwrap();

        assert_eq!(result.status, ConsensusStatus::Committed);
        assert!(result.verified);
        assert_eq!(result.view, 1);
        assert_eq!(result.view_changes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_equivocating_primary_caught_by_gossip() {
        let system = system();
        let (handle, ids) = pool_with(&system, 4, Topology::Mesh, &[(0, AgentBehavior::Equivocating)]);

        let result = system.propose_and_vote(Verdict::Valid, handle).await.unwrap();

        assert!(result.is_committed());
        assert_eq!(result.view, 1);
        assert_eq!(result.byzantine_agents_detected, vec![ids[0]]);
        assert!(matches!(
            result.evidence[0],
            ByzantineEvidence::ConflictingProposals { primary, view: 0, .. } if primary == ids[0]
        ));
    }

    // =========================================================================
    // BYZANTINE FRACTION > 1/3
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_half_inverting_pool_times_out() {
        let system = system();
        let (handle, _) = pool_with(
            &system,
            4,
            Topology::Mesh,
            &[(2, AgentBehavior::Inverting), (3, AgentBehavior::Inverting)],
        );

        let result = system.propose_and_vote(Verdict::Valid, handle).await.unwrap();

        assert_eq!(result.status, ConsensusStatus::Timeout);
        assert_eq!(result.value, None);
        assert!(!result.verified);
        assert_eq!(
            result.view_changes,
            system.config().consensus.max_view_changes
        );
        assert_eq!(
            system.decisions().count_by_status(ConsensusStatus::Timeout),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_agents_commit_but_are_not_bft_safe() {
        let system = system();
        let (handle, _) = pool_with(&system, 3, Topology::Mesh, &[]);

        let result = system.propose_and_vote(Verdict::Valid, handle).await.unwrap();

        assert!(result.is_committed());
        assert!(!result.bft_safe);
        assert!(!system.pool(handle).unwrap().is_bft_safe());
    }
}
