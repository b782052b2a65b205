//! # Verification Scenarios
//!
//! Direct, cached and batch verification without consensus.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{signed, system};
    use av_01_signature_verification::{CacheConfig, VerificationItem};
    use av_runtime::{SystemError, VerificationSystem};
    use proptest::prelude::*;
    use shared_crypto::{CryptoError, Identity};
    use shared_types::ManualTimeSource;
    use std::sync::Arc;
    use std::time::Duration;

    // =========================================================================
    // CACHE
    // =========================================================================

    #[test]
    fn test_second_lookup_is_cached_with_same_answer() {
        let system = system();
        let (pk, sig) = signed(b"hello");

        let first = system.verify(&pk, b"hello", &sig).unwrap();
        let second = system.verify(&pk, b"hello", &sig).unwrap();

        assert!(first.valid);
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.valid, second.valid);

        let stats = system.cache_stats();
        assert_eq!((stats.size, stats.hits, stats.misses), (1, 1, 1));
        assert!((stats.hit_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_negative_result_is_cached_too() {
        let system = system();
        let (pk, sig) = signed(b"genuine");

        assert!(!system.verify(&pk, b"forged", &sig).unwrap().valid);
        let again = system.verify(&pk, b"forged", &sig).unwrap();
        assert!(!again.valid);
        assert!(again.cached);
    }

    #[test]
    fn test_expired_entry_is_recomputed() {
        let clock = Arc::new(ManualTimeSource::new(0));
        let system = VerificationSystem::builder()
            .cache(CacheConfig {
                ttl: Duration::from_secs(10),
                ..CacheConfig::default()
            })
            .time_source(clock.clone())
            .build()
            .unwrap();
        let (pk, sig) = signed(b"short-lived");

        system.verify(&pk, b"short-lived", &sig).unwrap();
        clock.advance(9_999);
        assert!(system.verify(&pk, b"short-lived", &sig).unwrap().cached);

        clock.advance(1);
        let outcome = system.verify(&pk, b"short-lived", &sig).unwrap();
        assert!(outcome.valid);
        assert!(!outcome.cached);
    }

    #[test]
    fn test_clear_cache_forces_recompute() {
        let system = system();
        let (pk, sig) = signed(b"clear me");
        system.verify(&pk, b"clear me", &sig).unwrap();

        system.clear_cache();
        assert_eq!(system.cache_stats().size, 0);
        assert!(!system.verify(&pk, b"clear me", &sig).unwrap().cached);
    }

    // =========================================================================
    // INPUT ERRORS
    // =========================================================================

    #[test]
    fn test_wrong_lengths_are_input_errors() {
        let system = system();
        let (pk, sig) = signed(b"m");

        let err = system.verify(&pk[..31], b"m", &sig).unwrap_err();
        assert!(err.is_input_error());
        assert!(matches!(
            err,
            SystemError::Verification(_)
        ));

        let err = system.verify_signature(&pk, b"m", &sig[..63]).unwrap_err();
        assert!(err.is_input_error());
        assert_eq!(system.cache_stats().size, 0);
    }

    #[test]
    fn test_empty_message_round_trips() {
        let system = system();
        let (pk, sig) = signed(b"");
        assert!(system.verify_signature(&pk, b"", &sig).unwrap());
    }

    // =========================================================================
    // BATCH
    // =========================================================================

    fn batch(n: usize) -> Vec<VerificationItem> {
        let identity = Identity::generate().unwrap();
        (0..n)
            .map(|i| {
                let message = format!("batch message {i}").into_bytes();
                let signature = identity.sign(&message).unwrap();
                VerificationItem::new(
                    identity.public_key().as_bytes().to_vec(),
                    message,
                    signature.to_vec(),
                )
                .with_id(format!("tx-{i}"))
            })
            .collect()
    }

    #[test]
    fn test_batch_isolates_failing_item() {
        let system = system();
        let mut items = batch(50);
        items[17].signature = vec![0u8; 12];

        let result = system.batch_verify(items).unwrap();

        assert_eq!(result.total, 50);
        assert_eq!(result.valid, 49);
        assert_eq!(result.failed, 1);
        let failed: Vec<_> = result.results.iter().filter(|r| r.failed()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].index, 17);
        assert_eq!(failed[0].id.as_deref(), Some("tx-17"));
        assert!(matches!(
            failed[0].error,
            Some(CryptoError::InvalidSignatureLength { actual: 12, .. })
        ));
    }

    #[test]
    fn test_batch_larger_than_chunk_keeps_order() {
        let system = system();
        let mut items = batch(2_500);
        items[1_234].message = b"tampered".to_vec();

        let result = system.batch_verify(items).unwrap();

        assert_eq!(result.total, 2_500);
        assert_eq!(result.valid, 2_499);
        assert_eq!(result.invalid, 1);
        assert_eq!(result.failed, 0);
        assert!(result
            .results
            .iter()
            .enumerate()
            .all(|(i, r)| r.index == i));
        assert!(!result.results[1_234].valid);
    }

    #[test]
    fn test_empty_batch() {
        let result = system().batch_verify(Vec::new()).unwrap();
        assert_eq!(result.total, 0);
        assert!(result.results.is_empty());
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_sign_then_verify_holds(message in proptest::collection::vec(any::<u8>(), 0..512)) {
            let system = system();
            let (pk, sig) = signed(&message);
            prop_assert!(system.verify_signature(&pk, &message, &sig).unwrap());
        }

        #[test]
        fn test_any_bit_flip_rejects(bit in 0usize..512) {
            let system = system();
            let (pk, mut sig) = signed(b"bit flip target");
            sig[bit / 8] ^= 1 << (bit % 8);
            prop_assert!(!system.verify_signature(&pk, b"bit flip target", &sig).unwrap());
        }

        #[test]
        fn test_cache_never_changes_answer(tamper in any::<bool>()) {
            let system = system();
            let (pk, sig) = signed(b"stable");
            let message: &[u8] = if tamper { b"unstable" } else { b"stable" };
            let first = system.verify(&pk, message, &sig).unwrap();
            let second = system.verify(&pk, message, &sig).unwrap();
            prop_assert_eq!(first.valid, second.valid);
            prop_assert_eq!(first.valid, !tamper);
            prop_assert!(second.cached);
        }
    }
}
