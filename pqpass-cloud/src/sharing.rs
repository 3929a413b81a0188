//! Share workflow: create, list, accept, reject.
//!
//! A share is a password envelope keyed by a fresh KEM encapsulation
//! against the recipient's public key. A status change is reported to the
//! server first and applied locally only once the server has taken it, so a
//! failed report leaves the share pending and the call can be retried.

use crate::api_client::CloudApiClient;
use crate::error::{CloudError, CloudResult};
use crate::handshake::Session;
use crate::types::CreateShareRequest;
use pqpass_crypto::{kem, open_share, seal_for_share};
use pqpass_types::{
    ClientSecrets, KyPublic, PasswordRecord, ShareRecord, ShareStatus, TypesError, Uuid,
    format_uuid, parse_uuid,
};
use std::sync::Arc;
use tracing::{info, warn};

fn share_err(e: impl std::fmt::Display) -> CloudError {
    CloudError::Share(e.to_string())
}

fn ensure_pending(share: &ShareRecord, to: ShareStatus) -> CloudResult<()> {
    if share.status().is_terminal() {
        return Err(CloudError::Types(TypesError::InvalidShareTransition {
            from: share.status(),
            to,
        }));
    }
    Ok(())
}

/// Orchestrates sharing against the server.
pub struct ShareManager {
    api: Arc<CloudApiClient>,
}

impl ShareManager {
    pub fn new(api: Arc<CloudApiClient>) -> Self {
        Self { api }
    }

    /// Shares `record` with `recipient`. Returns the share id and the
    /// pending share as sent.
    pub async fn create_share(
        &self,
        session: &Session,
        recipient: Uuid,
        record: &PasswordRecord,
    ) -> CloudResult<(Uuid, ShareRecord)> {
        let key = self
            .api
            .public_key(session, recipient)
            .await
            .map_err(share_err)?;
        let recipient_key = KyPublic::from_slice(&key.bytes).map_err(share_err)?;

        let (kem_ciphertext, shared) = kem::encapsulate(&recipient_key)?;
        let envelope = seal_for_share(&shared, record)?;
        let share = ShareRecord::new(kem_ciphertext, envelope);

        let req = CreateShareRequest {
            recipient: format_uuid(&recipient),
            kem_ciphertext: share.kem_ciphertext.clone(),
            password: share.envelope.clone(),
        };
        let id = self.api.share(session, &req).await.map_err(share_err)?;
        let id = parse_uuid(&id).map_err(share_err)?;
        info!("created share {id} for {recipient}");
        Ok((id, share))
    }

    /// Shares addressed to the session owner. Entries with malformed ids
    /// are skipped.
    pub async fn incoming_shares(&self, session: &Session) -> CloudResult<Vec<(ShareRecord, Uuid)>> {
        let resp = self.api.shared(session).await.map_err(share_err)?;
        Ok(resp
            .shares
            .into_iter()
            .filter_map(|(share, id)| match parse_uuid(&id) {
                Ok(id) => Some((share, id)),
                Err(e) => {
                    warn!("skipping share with invalid id {id}: {e}");
                    None
                }
            })
            .collect())
    }

    /// Opens a pending share and marks it accepted.
    pub async fn accept_share(
        &self,
        session: &Session,
        secrets: &ClientSecrets,
        share_id: Uuid,
        share: &mut ShareRecord,
    ) -> CloudResult<PasswordRecord> {
        ensure_pending(share, ShareStatus::Accepted)?;
        let shared = kem::decapsulate(&secrets.ky_secret, &share.kem_ciphertext)?;
        let record = open_share(&shared, &share.envelope)?;

        self.api
            .share_status(session, share_id, ShareStatus::Accepted)
            .await
            .map_err(share_err)?;
        share.accept()?;
        info!("accepted share {share_id}");
        Ok(record)
    }

    /// Marks a pending share rejected.
    pub async fn reject_share(
        &self,
        session: &Session,
        share_id: Uuid,
        share: &mut ShareRecord,
    ) -> CloudResult<()> {
        ensure_pending(share, ShareStatus::Rejected)?;
        self.api
            .share_status(session, share_id, ShareStatus::Rejected)
            .await
            .map_err(share_err)?;
        share.reject()?;
        info!("rejected share {share_id}");
        Ok(())
    }
}
