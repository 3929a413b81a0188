//! XChaCha20-Poly1305 authenticated encryption.
//!
//! Every call to [`encrypt`] draws a fresh 24-byte nonce from the OS RNG.
//! Callers cannot supply a nonce.

use crate::error::{CryptoError, CryptoResult};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric key size in bytes.
pub const KEY_SIZE: usize = 32;
/// XChaCha20 nonce size in bytes.
pub const NONCE_SIZE: usize = 24;
/// Poly1305 tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// 256-bit symmetric key, zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let array = <[u8; KEY_SIZE]>::try_from(bytes).map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Ciphertext (with appended tag) and the nonce it was sealed under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_SIZE],
}

/// Generates a random symmetric key.
pub fn generate_random_key() -> SymmetricKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    SymmetricKey(bytes)
}

/// Encrypts `plaintext` under `key` with empty associated data.
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> CryptoResult<Sealed> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key.0));
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    nonce_bytes.copy_from_slice(nonce.as_slice());
    Ok(Sealed {
        ciphertext,
        nonce: nonce_bytes,
    })
}

/// Decrypts and authenticates `ciphertext`.
///
/// A nonce of the wrong length is treated like any other authentication
/// failure: the caller learns only that the input did not verify.
pub fn decrypt(key: &SymmetricKey, ciphertext: &[u8], nonce: &[u8]) -> CryptoResult<Vec<u8>> {
    if nonce.len() != NONCE_SIZE {
        return Err(CryptoError::AuthFailure);
    }
    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key.0));
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::AuthFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let key = generate_random_key();
        let sealed = encrypt(&key, b"hello").unwrap();
        assert_eq!(sealed.ciphertext.len(), 5 + TAG_SIZE);
        assert_eq!(decrypt(&key, &sealed.ciphertext, &sealed.nonce).unwrap(), b"hello");
    }

    #[test]
    fn nonces_are_fresh() {
        let key = generate_random_key();
        let a = encrypt(&key, b"same").unwrap();
        let b = encrypt(&key, b"same").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn short_nonce_is_auth_failure() {
        let key = generate_random_key();
        let sealed = encrypt(&key, b"x").unwrap();
        assert!(matches!(
            decrypt(&key, &sealed.ciphertext, &sealed.nonce[..12]),
            Err(CryptoError::AuthFailure)
        ));
    }

    #[test]
    fn key_debug_redacted() {
        assert_eq!(format!("{:?}", generate_random_key()), "SymmetricKey([REDACTED])");
    }
}
