//! # Agent Identity
//!
//! An Ed25519 signing key, its public key, and a `did:key` style identifier
//! derived from the public key.
//!
//! ## Key Hygiene
//!
//! - The signing key is zeroized by [`Identity::destroy`] and on drop.
//!   Dropping without calling `destroy` is still safe; `destroy` exists so
//!   callers can wipe material at a known point.
//! - Seed buffers handed to [`Identity::from_seed`] are wiped in every
//!   outcome, including errors.
//! - `Debug` never prints secret material.

use crate::signatures::{Ed25519PublicKey, Ed25519Signature, PUBLIC_KEY_LENGTH};
use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

const DID_PREFIX: &str = "did:key:z";
const SECRET_LENGTH: usize = 32;

/// Signing identity owned by a single agent.
pub struct Identity {
    signing_key: Option<SigningKey>,
    public_key: Ed25519PublicKey,
    did: String,
}

impl Identity {
    /// Generate from the operating system RNG.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut secret = Zeroizing::new([0u8; SECRET_LENGTH]);
        OsRng
            .try_fill_bytes(&mut *secret)
            .map_err(|e| CryptoError::EntropyUnavailable(e.to_string()))?;
        Ok(Self::from_secret(&secret))
    }

    /// Load from a 32-byte seed or a 64-byte `seed || public_key` keypair.
    ///
    /// The buffer is zeroized before returning, whatever the outcome.
    pub fn from_seed(seed: &mut [u8]) -> Result<Self, CryptoError> {
        let result = Self::derive(seed);
        seed.zeroize();
        result
    }

    fn derive(seed: &[u8]) -> Result<Self, CryptoError> {
        match seed.len() {
            SECRET_LENGTH => {
                let mut secret = Zeroizing::new([0u8; SECRET_LENGTH]);
                secret.copy_from_slice(seed);
                Ok(Self::from_secret(&secret))
            }
            len if len == SECRET_LENGTH + PUBLIC_KEY_LENGTH => {
                let mut secret = Zeroizing::new([0u8; SECRET_LENGTH]);
                secret.copy_from_slice(&seed[..SECRET_LENGTH]);
                let identity = Self::from_secret(&secret);
                let matches: bool = identity
                    .public_key
                    .as_bytes()
                    .ct_eq(&seed[SECRET_LENGTH..])
                    .into();
                if matches {
                    Ok(identity)
                } else {
                    Err(CryptoError::SeedKeyMismatch)
                }
            }
            other => Err(CryptoError::InvalidSeedLength(other)),
        }
    }

    fn from_secret(secret: &[u8; SECRET_LENGTH]) -> Self {
        let signing_key = SigningKey::from_bytes(secret);
        let public_key = Ed25519PublicKey::from_verifying_key(&signing_key.verifying_key());
        let did = format!("{DID_PREFIX}{}", public_key.to_hex());
        Self {
            signing_key: Some(signing_key),
            public_key,
            did,
        }
    }

    /// Public verification key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.public_key
    }

    /// Stable textual identifier derived from the public key.
    pub fn did(&self) -> &str {
        &self.did
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Result<Ed25519Signature, CryptoError> {
        let key = self.signing_key.as_ref().ok_or(CryptoError::KeyDestroyed)?;
        Ok(Ed25519Signature::from_bytes(key.sign(message).to_bytes()))
    }

    /// Verify a signature against this identity's public key.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> bool {
        self.public_key.verify(message, signature)
    }

    /// Zeroize the signing key. Signing afterwards fails with `KeyDestroyed`.
    pub fn destroy(&mut self) {
        // SigningKey zeroizes itself on drop.
        drop(self.signing_key.take());
    }

    /// Whether the signing key has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.signing_key.is_none()
    }
}

impl Drop for Identity {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("did", &self.did)
            .field("signing_key", &"[REDACTED]")
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
