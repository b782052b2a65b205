//! # Verification Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Direct Ed25519 verify | < 100µs |
//! | Cached verify (hit) | < 5µs |
//! | Batch verify, 1000 items | scales with worker count |

use av_01_signature_verification::{
    BatchConfig, CacheConfig, SignatureVerificationApi, SignatureVerificationService,
    VerificationItem,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::RngCore;
use shared_crypto::Identity;
use std::time::Duration;

/// Random message signed by `identity`.
fn signed_item(identity: &Identity, len: usize) -> VerificationItem {
    let mut message = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut message);
    let signature = identity.sign(&message).expect("signing");
    VerificationItem::new(
        identity.public_key().as_bytes().to_vec(),
        message,
        signature.to_vec(),
    )
}

fn bench_single_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("av-01-single");
    group.measurement_time(Duration::from_secs(5));

    let service = SignatureVerificationService::with_defaults().expect("service");
    let identity = Identity::generate().expect("identity");
    let item = signed_item(&identity, 256);

    group.bench_function("verify_direct", |b| {
        b.iter(|| {
            black_box(
                service
                    .verify_signature(&item.public_key, &item.message, &item.signature)
                    .expect("well-formed"),
            )
        })
    });

    service
        .verify(&item.public_key, &item.message, &item.signature)
        .expect("well-formed");
    group.bench_function("verify_cached_hit", |b| {
        b.iter(|| {
            black_box(
                service
                    .verify(&item.public_key, &item.message, &item.signature)
                    .expect("well-formed"),
            )
        })
    });

    group.finish();
}

fn bench_batch_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("av-01-batch");
    group.measurement_time(Duration::from_secs(10));

    let identity = Identity::generate().expect("identity");
    for size in [10usize, 100, 1_000] {
        let items: Vec<_> = (0..size).map(|_| signed_item(&identity, 128)).collect();
        for workers in [1usize, 4] {
            let service = SignatureVerificationService::new(
                CacheConfig::default(),
                BatchConfig {
                    max_concurrency: workers,
                    ..BatchConfig::default()
                },
            )
            .expect("service");

            group.throughput(Throughput::Elements(size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("batch_verify_{workers}w"), size),
                &items,
                |b, items| b.iter(|| black_box(service.batch_verify(items.clone()).expect("batch"))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_single_verification, bench_batch_verification);
criterion_main!(benches);
