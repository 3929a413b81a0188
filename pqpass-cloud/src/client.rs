//! High-level client tying identity, session and server together.

use crate::account::{self, Registration};
use crate::api_client::CloudApiClient;
use crate::config::CloudConfig;
use crate::error::{CloudError, CloudResult};
use crate::handshake::{self, Session, SessionState};
use crate::retrieval;
use crate::sharing::ShareManager;
use pqpass_types::{ClientEx, ClientSecrets, PasswordRecord, ShareRecord, Uuid};
use pqpass_vault::{PasswordCache, keyfile};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::{info, warn};

/// Identity and session, guarded together so readers never see a token
/// from one handshake paired with the secret from another.
struct AuthState {
    client: Option<ClientEx>,
    session: Option<Session>,
}

/// A pqpass client: one identity talking to one server.
///
/// Only one login runs at a time per instance; a second concurrent
/// [`PqPassClient::login`] fails with `HandshakeInProgress`. The stored
/// session is replaced only when a handshake completes.
pub struct PqPassClient {
    api: Arc<CloudApiClient>,
    shares: ShareManager,
    auth: RwLock<AuthState>,
    login_lock: Mutex<()>,
    state: watch::Sender<SessionState>,
}

impl PqPassClient {
    pub fn new(config: CloudConfig) -> CloudResult<Self> {
        Self::build(config, None)
    }

    /// Client with an existing identity, e.g. read from a key file.
    pub fn with_client(config: CloudConfig, client: ClientEx) -> CloudResult<Self> {
        Self::build(config, Some(client))
    }

    fn build(config: CloudConfig, client: Option<ClientEx>) -> CloudResult<Self> {
        let api = Arc::new(CloudApiClient::new(config)?);
        Ok(Self {
            shares: ShareManager::new(Arc::clone(&api)),
            api,
            auth: RwLock::new(AuthState {
                client,
                session: None,
            }),
            login_lock: Mutex::new(()),
            state: watch::Sender::new(SessionState::Unauthenticated),
        })
    }

    pub fn api(&self) -> &Arc<CloudApiClient> {
        &self.api
    }

    // ── Identity ──

    /// Registers a new account and adopts it as this client's identity.
    pub async fn register(&self, email: &str) -> CloudResult<Registration> {
        let registration = account::create_account(&self.api, email).await?;
        self.set_client(registration.client.clone()).await;
        Ok(registration)
    }

    /// Replaces the identity. Any existing session is dropped.
    pub async fn set_client(&self, client: ClientEx) {
        let mut auth = self.auth.write().await;
        auth.client = Some(client);
        auth.session = None;
        self.state.send_replace(SessionState::Unauthenticated);
    }

    pub async fn load_key_file(&self, path: impl AsRef<Path>) -> CloudResult<()> {
        let client = keyfile::load(path)?;
        self.set_client(client).await;
        Ok(())
    }

    pub async fn save_key_file(&self, path: impl AsRef<Path>) -> CloudResult<()> {
        let auth = self.auth.read().await;
        let client = auth.client.as_ref().ok_or(CloudError::NoIdentity)?;
        keyfile::save(path, client)?;
        Ok(())
    }

    /// Current identity, including its secret keys.
    pub async fn client(&self) -> Option<ClientEx> {
        self.auth.read().await.client.clone()
    }

    // ── Session ──

    /// Runs the handshake and stores the resulting session.
    pub async fn login(&self) -> CloudResult<Session> {
        let _guard = self
            .login_lock
            .try_lock()
            .map_err(|_| CloudError::HandshakeInProgress)?;

        let (id, mut secrets) = {
            let auth = self.auth.read().await;
            let client = auth.client.as_ref().ok_or(CloudError::NoIdentity)?;
            let id = client.id().ok_or(CloudError::NoIdentity)?;
            (id, client.secrets.clone())
        };

        self.state.send_replace(SessionState::Unauthenticated);
        let result = handshake::authenticate_observed(&self.api, id, &mut secrets, |state| {
            self.state.send_replace(state);
        })
        .await;

        let session = match result {
            Ok(session) => session,
            Err(e) => {
                warn!("login failed for {id}: {e}");
                let previous = if self.auth.read().await.session.is_some() {
                    SessionState::SecretSynced
                } else {
                    SessionState::Unauthenticated
                };
                self.state.send_replace(previous);
                return Err(e);
            }
        };

        let mut auth = self.auth.write().await;
        match auth.client.as_mut() {
            Some(client) if client.id() == Some(id) => client.secrets = secrets,
            _ => {
                self.state.send_replace(SessionState::Unauthenticated);
                return Err(CloudError::NoIdentity);
            }
        }
        auth.session = Some(session.clone());
        Ok(session)
    }

    pub async fn session(&self) -> Option<Session> {
        self.auth.read().await.session.clone()
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Subscribes to login progress.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Ends the session and forgets the session secret.
    pub async fn logout(&self) {
        let mut auth = self.auth.write().await;
        if let Some(client) = auth.client.as_mut() {
            client.secrets.clear_secret();
        }
        auth.session = None;
        self.state.send_replace(SessionState::Unauthenticated);
        info!("logged out");
    }

    /// Session and matching secrets, read under one lock.
    async fn ready(&self) -> CloudResult<(Session, ClientSecrets)> {
        let auth = self.auth.read().await;
        let session = auth.session.clone().ok_or(CloudError::AuthRequired)?;
        let client = auth.client.as_ref().ok_or(CloudError::NoIdentity)?;
        Ok((session, client.secrets.clone()))
    }

    // ── Passwords ──

    pub async fn upload(&self, record: &PasswordRecord) -> CloudResult<Uuid> {
        let (session, secrets) = self.ready().await?;
        retrieval::upload(&self.api, &session, &secrets, record).await
    }

    pub async fn fetch_all(&self) -> CloudResult<Vec<(PasswordRecord, Uuid)>> {
        let (session, secrets) = self.ready().await?;
        let parallelism = self.api.config().max_parallel_decrypts;
        retrieval::fetch_all(&self.api, &session, &secrets, parallelism).await
    }

    /// Replaces the cache contents with a fresh [`PqPassClient::fetch_all`].
    pub async fn refresh_cache(&self, cache: &PasswordCache) -> CloudResult<usize> {
        let records = self.fetch_all().await?;
        Ok(cache.rebuild(&records)?)
    }

    // ── Sharing ──

    pub async fn share(&self, recipient: Uuid, record: &PasswordRecord) -> CloudResult<Uuid> {
        let (session, _) = self.ready().await?;
        let (id, _) = self.shares.create_share(&session, recipient, record).await?;
        Ok(id)
    }

    pub async fn incoming_shares(&self) -> CloudResult<Vec<(ShareRecord, Uuid)>> {
        let (session, _) = self.ready().await?;
        self.shares.incoming_shares(&session).await
    }

    pub async fn accept_share(
        &self,
        share_id: Uuid,
        share: &mut ShareRecord,
    ) -> CloudResult<PasswordRecord> {
        let (session, secrets) = self.ready().await?;
        self.shares
            .accept_share(&session, &secrets, share_id, share)
            .await
    }

    pub async fn reject_share(&self, share_id: Uuid, share: &mut ShareRecord) -> CloudResult<()> {
        let (session, _) = self.ready().await?;
        self.shares.reject_share(&session, share_id, share).await
    }
}
