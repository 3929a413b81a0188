//! HTTP client for the pqpass server API.
//!
//! Every call returns the raw API outcome; callers map failures into the
//! error that names their operation (registration, handshake stage, fetch).

use crate::config::CloudConfig;
use crate::error::{CloudError, CloudResult};
use crate::handshake::{Session, parse_session_token};
use crate::types::*;
use pqpass_types::{EncryptedPassword, ShareStatus, Uuid};
use reqwest::header::{AUTHORIZATION, SET_COOKIE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client for a pqpass server.
pub struct CloudApiClient {
    client: Client,
    config: CloudConfig,
}

impl CloudApiClient {
    pub fn new(config: CloudConfig) -> CloudResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CloudError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    /// Attaches the session token. The server expects the raw token, not a
    /// bearer scheme.
    fn authorized(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder.header(AUTHORIZATION, session.token())
    }

    // ── Registration ──

    pub async fn create_user(&self, req: &CreateUserRequest) -> CloudResult<CreateUserResponse> {
        debug!("registering {}", req.email);
        let resp = self
            .client
            .post(self.url("create_user/"))
            .json(req)
            .send()
            .await?;
        read_json(resp).await
    }

    // ── Handshake ──

    /// Fetches the bytes the client must sign.
    pub async fn challenge(&self, id: Uuid) -> CloudResult<Vec<u8>> {
        let resp = self
            .client
            .get(self.url(&format!("challenge/{id}")))
            .send()
            .await?;
        read_json(resp).await
    }

    /// Submits the signed challenge. Returns the session token carried in
    /// `Set-Cookie`, or `None` when the server sent no usable cookie.
    pub async fn verify(&self, id: Uuid, signature: &[u8]) -> CloudResult<Option<String>> {
        let resp = self
            .client
            .post(self.url(&format!("verify/{id}")))
            .json(signature)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| CloudError::Api(e.to_string()))?;

        Ok(resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(parse_session_token))
    }

    /// Fetches the KEM ciphertext that carries the session secret.
    pub async fn sync(&self, session: &Session) -> CloudResult<Vec<u8>> {
        let req = self.client.get(self.url(&format!("sync/{}", session.owner())));
        let resp = self.authorized(req, session).send().await?;
        read_json(resp).await
    }

    // ── Passwords ──

    pub async fn send_all(&self, session: &Session) -> CloudResult<SendAllResponse> {
        let req = self
            .client
            .get(self.url(&format!("send_all/{}", session.owner())));
        let resp = self.authorized(req, session).send().await?;
        read_json(resp).await
    }

    /// Stores one envelope. Returns the server-assigned record id as text.
    pub async fn send(&self, session: &Session, ep: &EncryptedPassword) -> CloudResult<String> {
        let req = self
            .client
            .post(self.url(&format!("send/{}", session.owner())))
            .json(ep);
        let resp = self.authorized(req, session).send().await?;
        read_json(resp).await
    }

    // ── Sharing ──

    pub async fn public_key(&self, session: &Session, user: Uuid) -> CloudResult<KeyBytes> {
        let req = self.client.get(self.url(&format!("public_key/{user}")));
        let resp = self.authorized(req, session).send().await?;
        read_json(resp).await
    }

    pub async fn share(&self, session: &Session, req: &CreateShareRequest) -> CloudResult<String> {
        debug!("sharing record with {}", req.recipient);
        let builder = self
            .client
            .post(self.url(&format!("share/{}", session.owner())))
            .json(req);
        let resp = self.authorized(builder, session).send().await?;
        read_json(resp).await
    }

    pub async fn shared(&self, session: &Session) -> CloudResult<SharedResponse> {
        let req = self
            .client
            .get(self.url(&format!("shared/{}", session.owner())));
        let resp = self.authorized(req, session).send().await?;
        read_json(resp).await
    }

    pub async fn share_status(
        &self,
        session: &Session,
        share_id: Uuid,
        status: ShareStatus,
    ) -> CloudResult<()> {
        let req = self
            .client
            .post(self.url(&format!("share_status/{}/{share_id}", session.owner())))
            .json(&ShareStatusRequest { status });
        self.authorized(req, session)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| CloudError::Api(e.to_string()))?;
        Ok(())
    }
}

/// Checks the status and decodes a JSON body. An empty body is an error.
async fn read_json<T: DeserializeOwned>(resp: Response) -> CloudResult<T> {
    let resp = resp
        .error_for_status()
        .map_err(|e| CloudError::Api(e.to_string()))?;
    let body = resp.bytes().await?;
    if body.is_empty() {
        return Err(CloudError::Api("empty response body".into()));
    }
    Ok(serde_json::from_slice(&body)?)
}
