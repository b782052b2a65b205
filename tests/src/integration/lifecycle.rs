//! # Lifecycle Scenarios
//!
//! Pool spawn and destroy, health-driven eviction, cancellation, and the
//! shared decision log.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{signed, system};
    use av_02_agent_pool::{AgentBehavior, AgentPoolApi, PoolConfig, PoolError, Proposition, Topology};
    use av_03_consensus::{CancelHandle, ConsensusStatus};
    use av_runtime::{SystemConfig, SystemError, VerificationSystem};
    use shared_types::Verdict;
    use std::time::Duration;

    #[test]
    fn test_pool_capacity_checked_before_spawning() {
        let system = VerificationSystem::builder()
            .pool(PoolConfig {
                max_pool_size: 8,
                ..PoolConfig::default()
            })
            .build()
            .unwrap();

        let err = system.spawn_pool(9, Topology::Mesh).unwrap_err();
        assert_eq!(
            err,
            SystemError::Pool(PoolError::PoolCapacity {
                requested: 9,
                current: 0,
                max: 8
            })
        );
        assert!(system.pool_handles().is_empty());
        assert!(system.spawn_pool(8, Topology::Mesh).is_ok());
    }

    #[test]
    fn test_pools_are_independent() {
        let system = system();
        let first = system.spawn_pool(4, Topology::Mesh).unwrap();
        let second = system.spawn_pool(5, Topology::Ring).unwrap();

        assert_ne!(first, second);
        assert_eq!(system.pool(first).unwrap().len(), 4);
        assert_eq!(system.pool(second).unwrap().len(), 5);
        assert_eq!(system.pool(second).unwrap().topology(), Topology::Ring);

        system.destroy_pool(first).unwrap();
        assert_eq!(system.pool_handles(), vec![second]);
        assert!(matches!(
            system.reputation(first),
            Err(SystemError::UnknownPool(h)) if h == first
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_does_not_cut_short_running_round() {
        let system = system();
        let handle = system.spawn_pool(4, Topology::Mesh).unwrap();
        let pool = system.pool(handle).unwrap();
        let primary = pool.agents()[0].id();
        pool.set_behavior(primary, AgentBehavior::SilentPrimary).unwrap();

        let (result, destroyed) = tokio::join!(
            system.propose_and_vote(Verdict::Valid, handle),
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                system.destroy_pool(handle)
            }
        );

        destroyed.unwrap();
        let result = result.unwrap();
        assert_eq!(result.status, ConsensusStatus::Committed);
        assert_eq!(result.view, 1);
        assert!(matches!(
            system.propose_and_vote(Verdict::Valid, handle).await,
            Err(SystemError::UnknownPool(_))
        ));
        assert_eq!(system.decisions().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_agents_leave_round_short_of_quorum() {
        let system = system();
        let handle = system.spawn_pool(4, Topology::Mesh).unwrap();
        let pool = system.pool(handle).unwrap();
        for agent in &pool.agents()[2..] {
            pool.set_behavior(agent.id(), AgentBehavior::Crashed).unwrap();
        }

        let summary = system.health_check(handle).unwrap();
        assert_eq!(summary.unreachable, 2);
        assert!(summary.evicted.is_empty());
        assert_eq!(pool.participants().len(), 2);

        let result = system.propose_and_vote(Verdict::Valid, handle).await.unwrap();
        assert_eq!(result.status, ConsensusStatus::InsufficientParticipants);
        assert!(!result.verified);
        assert_eq!(result.total_weight, 2.0);
    }

    #[test]
    fn test_persistently_failing_agents_evicted() {
        let system = system();
        let handle = system.spawn_pool(5, Topology::Mesh).unwrap();
        let pool = system.pool(handle).unwrap();
        let crashed = pool.agents()[4].id();
        pool.set_behavior(crashed, AgentBehavior::Crashed).unwrap();

        system.health_check(handle).unwrap();
        system.health_check(handle).unwrap();
        let summary = system.health_check(handle).unwrap();

        assert_eq!(summary.evicted, vec![crashed]);
        assert_eq!(pool.len(), 4);
        assert!(pool.get(&crashed).is_none());
        assert!(pool.is_bft_safe());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_round_is_aborted_and_logged() {
        let system = system();
        let handle = system.spawn_pool(4, Topology::Mesh).unwrap();
        let cancel = CancelHandle::new();
        cancel.cancel();

        let result = system
            .run_consensus(Proposition::Value(Verdict::Valid), cancel, handle)
            .await
            .unwrap();

        assert_eq!(result.status, ConsensusStatus::Aborted);
        assert!(!result.verified);
        assert_eq!(
            system.decisions().count_by_status(ConsensusStatus::Aborted),
            1
        );
        let reputation = system.reputation(handle).unwrap();
        assert!(reputation.ranked().iter().all(|(_, w)| *w == 1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_decision_log_spans_pools() {
        let system = system();
        let first = system.spawn_pool(4, Topology::Mesh).unwrap();
        let second = system.spawn_pool(4, Topology::Star).unwrap();
        let (pk, sig) = signed(b"audited");

        let a = system
            .verify_with_consensus(b"audited", &sig, &pk, first)
            .await
            .unwrap();
        let b = system.propose_and_vote(Verdict::Invalid, second).await.unwrap();

        let log = system.decisions();
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(&a.round_id).unwrap().value, Some(Verdict::Valid));
        assert_eq!(log.get(&b.round_id).unwrap().value, Some(Verdict::Invalid));
        assert_eq!(log.count_by_status(ConsensusStatus::Committed), 2);
    }

    #[test]
    fn test_env_config_drives_system() {
        let config = SystemConfig::from_lookup(|key| match key {
            "AV_MAX_POOL_SIZE" => Some("4".to_string()),
            _ => None,
        });
        let system = VerificationSystem::new(config).unwrap();
        assert!(system.spawn_pool(4, Topology::Mesh).is_ok());
        assert!(matches!(
            system.spawn_pool(5, Topology::Mesh),
            Err(SystemError::Pool(PoolError::PoolCapacity { .. }))
        ));
    }
}
