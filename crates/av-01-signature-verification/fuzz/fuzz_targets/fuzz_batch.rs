//! Fuzz target for batch verification isolation.
//!
//! ## Running
//!
//! ```bash
//! cd crates/av-01-signature-verification
//! cargo +nightly fuzz run fuzz_batch
//! ```

#![no_main]

use av_01_signature_verification::{BatchConfig, BatchVerifier, VerificationItem};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzItem {
    public_key: Vec<u8>,
    message: Vec<u8>,
    signature: Vec<u8>,
}

fuzz_target!(|items: Vec<FuzzItem>| {
    let config = BatchConfig {
        max_batch_size: 7,
        max_concurrency: 2,
        ..BatchConfig::default()
    };
    let Ok(verifier) = BatchVerifier::new(config) else {
        return;
    };

    let items: Vec<VerificationItem> = items
        .into_iter()
        .map(|i| VerificationItem::new(i.public_key, i.message, i.signature))
        .collect();
    let total = items.len();

    if let Ok(result) = verifier.verify_large_batch(items) {
        assert_eq!(result.total, total);
        assert_eq!(result.results.len(), total);
        assert_eq!(result.valid + result.invalid, total);
        assert!(result.failed <= result.invalid);
    }
});
