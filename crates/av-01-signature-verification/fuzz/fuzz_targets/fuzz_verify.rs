//! Fuzz target for cached Ed25519 verification.
//!
//! ## Running
//!
//! ```bash
//! cd crates/av-01-signature-verification
//! cargo +nightly fuzz run fuzz_verify
//! ```

#![no_main]

use av_01_signature_verification::{SignatureVerificationApi, SignatureVerificationService};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzInput {
    public_key: Vec<u8>,
    message: Vec<u8>,
    signature: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let Ok(service) = SignatureVerificationService::with_defaults() else {
        return;
    };

    // Must never panic, whatever the lengths.
    let first = service.verify(&input.public_key, &input.message, &input.signature);
    let second = service.verify(&input.public_key, &input.message, &input.signature);

    match (first, second) {
        (Ok(a), Ok(b)) => {
            assert_eq!(a.valid, b.valid);
            assert!(!a.cached);
            assert!(b.cached);
        }
        (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
        _ => panic!("verification outcome changed between calls"),
    }
});
