//! # Integration Scenarios
//!
//! Every scenario builds a fresh `VerificationSystem`, so nothing is shared
//! between tests. Consensus tests run on a paused tokio clock: phase
//! timeouts elapse instantly and deterministically.

pub mod consensus;
pub mod lifecycle;
pub mod verification;

#[cfg(test)]
pub(crate) mod fixtures {
    use av_runtime::{SystemConfig, VerificationSystem};
    use shared_crypto::Identity;

    pub fn system() -> VerificationSystem {
        VerificationSystem::new(SystemConfig::default()).unwrap()
    }

    /// `(public_key, signature)` over `message` from a fresh identity.
    pub fn signed(message: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let identity = Identity::generate().unwrap();
        let signature = identity.sign(message).unwrap();
        (identity.public_key().as_bytes().to_vec(), signature.to_vec())
    }
}
