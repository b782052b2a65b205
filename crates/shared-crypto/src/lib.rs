//! # Shared Crypto - Signature Engine and Identities
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `signatures` | Ed25519 | Keypair generation, signing, strict verification |
//! | `identity` | Ed25519 + `did:key` | Agent identities with zeroizing key material |
//! | `hashing` | BLAKE3 | Verification cache fingerprints |
//!
//! ## Security Properties
//!
//! - **Ed25519**: deterministic nonces, strict verification (rejects
//!   small-order keys and non-canonical signatures)
//! - **Key material**: zeroized on `destroy()` and on drop, never printed
//! - **Seeds**: caller-supplied seed buffers are wiped once the key is derived

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod identity;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{fingerprint, Fingerprint};
pub use identity::Identity;
pub use signatures::{
    Ed25519PublicKey, Ed25519Signature, SignatureEngine, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
