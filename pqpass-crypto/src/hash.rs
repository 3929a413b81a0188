//! BLAKE3 as a key-derivation step.
//!
//! `hash32` turns raw key material (a KEM secret key, a session secret) into
//! a 256-bit symmetric key. It is not used as a general-purpose digest.

use crate::cipher::SymmetricKey;

/// Output size of [`hash32`].
pub const HASH_SIZE: usize = 32;

/// 256-bit BLAKE3 digest of `input`.
pub fn hash32(input: &[u8]) -> [u8; HASH_SIZE] {
    *blake3::hash(input).as_bytes()
}

/// Derives the symmetric key for an envelope layer from raw key material.
pub fn derive_key(material: &[u8]) -> SymmetricKey {
    SymmetricKey::from_bytes(hash32(material))
}

/// Short hex identifier for key material, safe to log.
pub fn fingerprint(material: &[u8]) -> String {
    hex::encode(&hash32(material)[..8])
}
