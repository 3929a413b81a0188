//! ML-KEM-1024 key encapsulation.

use crate::error::{CryptoError, CryptoResult};
use pqcrypto_mlkem::mlkem1024;
use pqcrypto_traits::kem::{
    Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _,
};
use pqpass_types::{KY_PUBLIC_LEN, KY_SECRET_LEN, KyPublic, KySecret, SECRET_LEN, SessionSecret};

/// ML-KEM-1024 ciphertext size in bytes.
pub const CIPHERTEXT_SIZE: usize = 1568;

/// Generates a fresh ML-KEM-1024 keypair.
pub fn generate_keypair() -> CryptoResult<(KyPublic, KySecret)> {
    let (pk, sk) = mlkem1024::keypair();
    let public = KyPublic::from_slice(pk.as_bytes()).map_err(|_| CryptoError::InvalidKeyLength {
        expected: KY_PUBLIC_LEN,
        actual: pk.as_bytes().len(),
    })?;
    let secret = KySecret::from_slice(sk.as_bytes()).map_err(|_| CryptoError::InvalidKeyLength {
        expected: KY_SECRET_LEN,
        actual: sk.as_bytes().len(),
    })?;
    Ok((public, secret))
}

/// Encapsulates a fresh shared secret to `recipient`.
///
/// Returns `(ciphertext, shared_secret)`; only the holder of the matching
/// secret key can recover the shared secret from the ciphertext.
pub fn encapsulate(recipient: &KyPublic) -> CryptoResult<(Vec<u8>, SessionSecret)> {
    let pk = mlkem1024::PublicKey::from_bytes(recipient.as_ref())
        .map_err(|e| CryptoError::Encapsulation(format!("invalid ML-KEM-1024 public key: {e:?}")))?;
    let (ss, ct) = mlkem1024::encapsulate(&pk);
    let shared = SessionSecret::from_slice(ss.as_bytes())
        .map_err(|e| CryptoError::Encapsulation(e.to_string()))?;
    Ok((ct.as_bytes().to_vec(), shared))
}

/// Recovers the shared secret from `ciphertext`.
///
/// ML-KEM uses implicit rejection: a ciphertext made for another key yields
/// an unrelated secret rather than an error, which surfaces later as an
/// authentication failure. Malformed inputs fail here.
pub fn decapsulate(secret: &KySecret, ciphertext: &[u8]) -> CryptoResult<SessionSecret> {
    if ciphertext.len() != CIPHERTEXT_SIZE {
        return Err(CryptoError::DecapFailure(format!(
            "ciphertext must be {CIPHERTEXT_SIZE} bytes, got {}",
            ciphertext.len()
        )));
    }
    let sk = mlkem1024::SecretKey::from_bytes(secret.as_ref())
        .map_err(|e| CryptoError::DecapFailure(format!("invalid ML-KEM-1024 secret key: {e:?}")))?;
    let ct = mlkem1024::Ciphertext::from_bytes(ciphertext)
        .map_err(|e| CryptoError::DecapFailure(format!("invalid ML-KEM-1024 ciphertext: {e:?}")))?;
    let ss = mlkem1024::decapsulate(&ct, &sk);
    SessionSecret::from_slice(ss.as_bytes()).map_err(|_| CryptoError::InvalidKeyLength {
        expected: SECRET_LEN,
        actual: ss.as_bytes().len(),
    })
}
