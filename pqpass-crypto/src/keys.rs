//! Client key generation.

use crate::error::CryptoResult;
use crate::{kem, sign};
use pqpass_types::{ClientSecrets, SECRET_LEN, SessionSecret};
use rand::RngCore;
use zeroize::Zeroize;

/// Generates both keypairs and a random placeholder session secret.
///
/// The placeholder is overwritten by the first successful handshake.
pub fn generate_client_secrets() -> CryptoResult<ClientSecrets> {
    let (ky_public, ky_secret) = kem::generate_keypair()?;
    let (di_public, di_secret) = sign::generate_keypair()?;

    let mut placeholder = [0u8; SECRET_LEN];
    rand::rngs::OsRng.fill_bytes(&mut placeholder);
    let secret = SessionSecret::from_array(placeholder);
    placeholder.zeroize();

    Ok(ClientSecrets {
        ky_public,
        ky_secret,
        di_public,
        di_secret,
        secret: Some(secret),
    })
}
