//! ML-DSA-87 signatures.

use crate::error::{CryptoError, CryptoResult};
use pqcrypto_mldsa::mldsa87;
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};
use pqpass_types::{DI_PUBLIC_LEN, DI_SECRET_LEN, DiPublic, DiSecret};

/// Generates a fresh ML-DSA-87 keypair.
pub fn generate_keypair() -> CryptoResult<(DiPublic, DiSecret)> {
    let (pk, sk) = mldsa87::keypair();
    let public = DiPublic::from_slice(pk.as_bytes()).map_err(|_| CryptoError::InvalidKeyLength {
        expected: DI_PUBLIC_LEN,
        actual: pk.as_bytes().len(),
    })?;
    let secret = DiSecret::from_slice(sk.as_bytes()).map_err(|_| CryptoError::InvalidKeyLength {
        expected: DI_SECRET_LEN,
        actual: sk.as_bytes().len(),
    })?;
    Ok((public, secret))
}

/// Produces a detached signature over `message`.
pub fn sign(secret: &DiSecret, message: &[u8]) -> CryptoResult<Vec<u8>> {
    let sk = mldsa87::SecretKey::from_bytes(secret.as_ref())
        .map_err(|e| CryptoError::SignFailure(format!("invalid ML-DSA-87 secret key: {e:?}")))?;
    let sig = mldsa87::detached_sign(message, &sk);
    Ok(sig.as_bytes().to_vec())
}

/// Checks a detached signature. Malformed signatures simply fail to verify.
pub fn verify(public: &DiPublic, message: &[u8], signature: &[u8]) -> bool {
    let Ok(pk) = mldsa87::PublicKey::from_bytes(public.as_ref()) else {
        return false;
    };
    let Ok(sig) = mldsa87::DetachedSignature::from_bytes(signature) else {
        return false;
    };
    mldsa87::verify_detached_signature(&sig, message, &pk).is_ok()
}
