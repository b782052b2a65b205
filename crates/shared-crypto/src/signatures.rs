//! # Ed25519 Signature Engine
//!
//! Twisted Edwards curve signatures with deterministic nonces.
//!
//! ## Verification Semantics
//!
//! - Wrong-length public keys and signatures are input errors.
//! - Everything else (bad curve point, non-canonical encoding, forged or
//!   corrupted signature) is a negative result: `Ok(false)`.
//! - Verification is strict: small-order keys and malleable signatures are
//!   rejected.

use crate::{CryptoError, Identity};
use ed25519_dalek::{Signature, VerifyingKey};
use std::fmt;

/// Length of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Ed25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; PUBLIC_KEY_LENGTH]);

impl Ed25519PublicKey {
    /// Create from bytes, validating the curve point.
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Result<Self, CryptoError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Create from a slice of unknown length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; PUBLIC_KEY_LENGTH] =
            bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_LENGTH,
                actual: bytes.len(),
            })?;
        Self::from_bytes(array)
    }

    pub(crate) fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Verify a signature under this key.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> bool {
        match VerifyingKey::from_bytes(&self.0) {
            Ok(key) => key
                .verify_strict(message, &Signature::from_bytes(&signature.0))
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519PublicKey({})", self.to_hex())
    }
}

/// Ed25519 signature (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature([u8; SIGNATURE_LENGTH]);

impl Ed25519Signature {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create from a slice of unknown length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; SIGNATURE_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidSignatureLength {
                    expected: SIGNATURE_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Copy into an owned buffer.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Signature({}..)", hex::encode(&self.0[..8]))
    }
}

/// Stateless Ed25519 engine: key generation, signing and verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureEngine;

impl SignatureEngine {
    /// Create an engine.
    pub fn new() -> Self {
        Self
    }

    /// Generate a fresh identity from the operating system RNG.
    pub fn generate(&self) -> Result<Identity, CryptoError> {
        Identity::generate()
    }

    /// Sign `message` with `identity`. Deterministic for a given key and message.
    pub fn sign(&self, identity: &Identity, message: &[u8]) -> Result<Ed25519Signature, CryptoError> {
        identity.sign(message)
    }

    /// Verify raw bytes.
    ///
    /// Returns `Err` only for wrong-length inputs; an invalid signature is
    /// `Ok(false)`.
    pub fn verify(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, CryptoError> {
        let key: &[u8; PUBLIC_KEY_LENGTH] =
            public_key
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: PUBLIC_KEY_LENGTH,
                    actual: public_key.len(),
                })?;
        let sig = Ed25519Signature::from_slice(signature)?;

        let Ok(verifying_key) = VerifyingKey::from_bytes(key) else {
            return Ok(false);
        };
        Ok(verifying_key
            .verify_strict(message, &Signature::from_bytes(&sig.0))
            .is_ok())
    }
}
