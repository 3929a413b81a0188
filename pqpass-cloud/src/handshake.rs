//! Challenge-response login.
//!
//! `Unauthenticated → ChallengeRequested → Signed → Verified → SecretSynced`
//!
//! The server issues a challenge, the client signs it with its ML-DSA key,
//! the server answers with a session token, and finally hands over a KEM
//! ciphertext whose decapsulation is the session secret. The secret is
//! written to [`ClientSecrets`] only once every step has succeeded.

use crate::api_client::CloudApiClient;
use crate::error::{CloudError, CloudResult, HandshakeStage};
use pqpass_crypto::{kem, sign};
use pqpass_types::{ClientSecrets, Uuid};
use std::fmt;
use tracing::{debug, info};

/// Progress of a login.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    ChallengeRequested,
    Signed,
    Verified,
    SecretSynced,
}

/// An authenticated session. Holding one means the handshake completed and
/// the session secret was stored.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    owner: Uuid,
    token: String,
}

impl Session {
    pub(crate) fn new(owner: Uuid, token: String) -> Self {
        Self { owner, token }
    }

    /// Id of the authenticated client.
    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("owner", &self.owner)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Extracts the token from a `Set-Cookie` value of the form
/// `token=<token>; ...`.
pub fn parse_session_token(header: &str) -> Option<String> {
    let first = header.split(';').next()?.trim();
    let token = first.strip_prefix("token=")?;
    (!token.is_empty()).then(|| token.to_string())
}

/// Runs the full handshake for `id`.
pub async fn authenticate(
    api: &CloudApiClient,
    id: Uuid,
    secrets: &mut ClientSecrets,
) -> CloudResult<Session> {
    authenticate_observed(api, id, secrets, |_| {}).await
}

/// [`authenticate`], reporting each state reached to `observe`.
pub async fn authenticate_observed(
    api: &CloudApiClient,
    id: Uuid,
    secrets: &mut ClientSecrets,
    mut observe: impl FnMut(SessionState),
) -> CloudResult<Session> {
    let challenge = api
        .challenge(id)
        .await
        .map_err(|e| CloudError::auth(HandshakeStage::Challenge, e))?;
    observe(SessionState::ChallengeRequested);
    debug!("received {}-byte challenge for {id}", challenge.len());

    let signature = sign::sign(&secrets.di_secret, &challenge)
        .map_err(|e| CloudError::auth(HandshakeStage::Sign, e))?;
    observe(SessionState::Signed);

    let token = api
        .verify(id, &signature)
        .await
        .map_err(|e| CloudError::auth(HandshakeStage::Verify, e))?
        .ok_or_else(|| CloudError::auth(HandshakeStage::Token, "no token cookie in response"))?;
    let session = Session::new(id, token);
    observe(SessionState::Verified);

    let kem_ciphertext = api
        .sync(&session)
        .await
        .map_err(|e| CloudError::auth(HandshakeStage::Sync, e))?;
    let secret = kem::decapsulate(&secrets.ky_secret, &kem_ciphertext)
        .map_err(|e| CloudError::auth(HandshakeStage::Decapsulate, e))?;

    secrets.set_secret(secret);
    observe(SessionState::SecretSynced);
    info!("authenticated {id}");
    Ok(session)
}
