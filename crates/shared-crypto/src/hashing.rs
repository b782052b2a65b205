//! # BLAKE3 Hashing
//!
//! Fingerprints for the verification cache. Each input is prefixed with its
//! length as a little-endian `u64` so `(pk, msg, sig)` splits can never
//! collide by shifting bytes between fields.

use blake3::Hasher;

/// Cache key derived from a verification triple.
pub type Fingerprint = [u8; 32];

const FINGERPRINT_DOMAIN: &[u8] = b"av-verification-fingerprint-v1";

struct FieldHasher(Hasher);

impl FieldHasher {
    fn update(&mut self, data: &[u8]) -> &mut Self {
        self.0.update(data);
        self
    }

    /// Length-prefixed field.
    fn update_prefixed(&mut self, data: &[u8]) -> &mut Self {
        self.0.update(&(data.len() as u64).to_le_bytes());
        self.0.update(data);
        self
    }

    fn finalize(&self) -> Fingerprint {
        *self.0.finalize().as_bytes()
    }
}

/// Fingerprint of `(public_key, message, signature)`.
pub fn fingerprint(public_key: &[u8], message: &[u8], signature: &[u8]) -> Fingerprint {
    let mut hasher = FieldHasher(Hasher::new());
    hasher
        .update(FINGERPRINT_DOMAIN)
        .update_prefixed(public_key)
        .update_prefixed(message)
        .update_prefixed(signature);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(
            fingerprint(b"pk", b"msg", b"sig"),
            fingerprint(b"pk", b"msg", b"sig")
        );
    }

    #[test]
    fn test_fingerprint_field_boundaries_matter() {
        // Same concatenation, different split.
        let a = fingerprint(b"ab", b"c", b"d");
        let b = fingerprint(b"a", b"bc", b"d");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_differs_from_plain_hash() {
        let mut concat = Vec::new();
        concat.extend_from_slice(b"pk");
        concat.extend_from_slice(b"msg");
        concat.extend_from_slice(b"sig");
        assert_ne!(
            fingerprint(b"pk", b"msg", b"sig"),
            *blake3::hash(&concat).as_bytes()
        );
    }
}
