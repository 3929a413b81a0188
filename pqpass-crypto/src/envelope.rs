//! Double-encryption envelope for password records.
//!
//! A record is serialized with the binary codec and sealed twice:
//!
//! 1. inner layer under `hash32(kySecret)` producing `nonce`
//! 2. outer layer over the inner ciphertext producing `nonce2`
//!
//! Decryption peels the outer layer with `hash32(session secret)` and the
//! inner layer with `hash32(kySecret)`. The upload helper
//! [`wrap_for_transit`] applies the outer layer with the KEM secret key
//! rather than the session secret, so its output only opens with
//! [`EnvelopeKeys::self_wrapped`]; see the transit tests.
//!
//! Shares reuse the same two-layer shape with the KEM shared secret as the
//! key material for both layers.

use crate::cipher::{self, SymmetricKey};
use crate::error::{CryptoError, CryptoResult};
use crate::hash::derive_key;
use pqpass_types::{
    ClientSecrets, Decode, Encode, EncryptedPassword, KySecret, PasswordRecord, SessionSecret,
};
use zeroize::Zeroize;

/// Both layer keys, derived once and shared read-only.
#[derive(Clone, Debug)]
pub struct EnvelopeKeys {
    outer: SymmetricKey,
    inner: SymmetricKey,
}

impl EnvelopeKeys {
    /// Keys for envelopes delivered by the server: outer layer under the
    /// session secret, inner layer under the KEM secret key.
    pub fn for_client(secrets: &ClientSecrets) -> CryptoResult<Self> {
        let session = secrets
            .secret
            .as_ref()
            .ok_or(CryptoError::MissingSessionSecret)?;
        Ok(Self::new(session.as_ref(), secrets.ky_secret.as_ref()))
    }

    /// Keys for envelopes produced by [`wrap_for_transit`], where both
    /// layers are derived from the KEM secret key.
    pub fn self_wrapped(ky_secret: &KySecret) -> Self {
        Self::new(ky_secret.as_ref(), ky_secret.as_ref())
    }

    /// Keys for a share: both layers derived from the KEM shared secret.
    pub fn for_share(shared: &SessionSecret) -> Self {
        Self::new(shared.as_ref(), shared.as_ref())
    }

    /// Derives both layer keys from raw key material.
    pub fn new(outer_material: &[u8], inner_material: &[u8]) -> Self {
        Self {
            outer: derive_key(outer_material),
            inner: derive_key(inner_material),
        }
    }
}

/// Applies the inner layer: `{nonce, None, ciphertext}`.
pub fn seal_record(ky_secret: &KySecret, record: &PasswordRecord) -> CryptoResult<EncryptedPassword> {
    seal_inner(&derive_key(ky_secret.as_ref()), record)
}

fn seal_inner(key: &SymmetricKey, record: &PasswordRecord) -> CryptoResult<EncryptedPassword> {
    let mut plaintext = record.to_bytes();
    let sealed = cipher::encrypt(key, &plaintext);
    plaintext.zeroize();
    let sealed = sealed?;

    Ok(EncryptedPassword {
        nonce: sealed.nonce.to_vec(),
        nonce2: None,
        ciphertext: sealed.ciphertext,
    })
}

/// Applies the outer layer with a key derived from `outer_material`.
pub fn wrap_outer(outer_material: &[u8], ep: &EncryptedPassword) -> CryptoResult<EncryptedPassword> {
    wrap_with(&derive_key(outer_material), ep)
}

fn wrap_with(key: &SymmetricKey, ep: &EncryptedPassword) -> CryptoResult<EncryptedPassword> {
    if ep.is_wrapped() {
        return Err(CryptoError::AlreadyWrapped);
    }
    let sealed = cipher::encrypt(key, &ep.ciphertext)?;
    Ok(EncryptedPassword {
        nonce: ep.nonce.clone(),
        nonce2: Some(sealed.nonce.to_vec()),
        ciphertext: sealed.ciphertext,
    })
}

/// Upload-path transit wrap: the outer layer reuses `hash32(kySecret)`.
pub fn wrap_for_transit(ky_secret: &KySecret, ep: &EncryptedPassword) -> CryptoResult<EncryptedPassword> {
    wrap_outer(ky_secret.as_ref(), ep)
}

/// Seals a record and applies the transit wrap in one step.
pub fn seal_for_upload(ky_secret: &KySecret, record: &PasswordRecord) -> CryptoResult<EncryptedPassword> {
    let inner = seal_record(ky_secret, record)?;
    wrap_for_transit(ky_secret, &inner)
}

/// Decrypts a server-delivered envelope with the client's keys.
pub fn open_password(ep: &EncryptedPassword, secrets: &ClientSecrets) -> CryptoResult<PasswordRecord> {
    if !ep.is_wrapped() {
        return Err(CryptoError::MissingOuterNonce);
    }
    open_with_keys(ep, &EnvelopeKeys::for_client(secrets)?)
}

/// Peels both layers with pre-derived keys.
///
/// Fails with `MissingOuterNonce` before attempting any decryption when the
/// outer layer was never applied.
pub fn open_with_keys(ep: &EncryptedPassword, keys: &EnvelopeKeys) -> CryptoResult<PasswordRecord> {
    let nonce2 = ep.nonce2.as_deref().ok_or(CryptoError::MissingOuterNonce)?;

    let inner_ciphertext = cipher::decrypt(&keys.outer, &ep.ciphertext, nonce2)
        .map_err(|_| CryptoError::DecryptionFailed { layer: "outer" })?;
    let mut plaintext = cipher::decrypt(&keys.inner, &inner_ciphertext, &ep.nonce)
        .map_err(|_| CryptoError::DecryptionFailed { layer: "inner" })?;

    let record = PasswordRecord::from_bytes(&plaintext).map_err(CryptoError::MalformedRecord);
    plaintext.zeroize();
    record
}

/// Builds the two-layer envelope for a share under the KEM shared secret.
pub fn seal_for_share(shared: &SessionSecret, record: &PasswordRecord) -> CryptoResult<EncryptedPassword> {
    let keys = EnvelopeKeys::for_share(shared);
    let inner = seal_inner(&keys.inner, record)?;
    wrap_with(&keys.outer, &inner)
}

/// Opens a share envelope with the decapsulated shared secret.
pub fn open_share(shared: &SessionSecret, ep: &EncryptedPassword) -> CryptoResult<PasswordRecord> {
    open_with_keys(ep, &EnvelopeKeys::for_share(shared))
}
