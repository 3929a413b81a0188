//! Bulk retrieval and upload of password envelopes.

use crate::api_client::CloudApiClient;
use crate::error::{CloudError, CloudResult};
use crate::handshake::Session;
use futures::stream::{self, StreamExt};
use pqpass_crypto::{EnvelopeKeys, open_with_keys, seal_for_upload};
use pqpass_types::{ClientSecrets, EncryptedPassword, PasswordRecord, Uuid, parse_uuid};
use std::sync::Arc;
use tracing::{info, warn};

/// Downloads every stored envelope and decrypts them concurrently.
///
/// Decryption runs on the blocking pool with at most `parallelism` envelopes
/// in flight. Output order matches the server's order. An envelope that
/// fails to decrypt, or whose id is malformed, is logged and left out; only
/// transport failures abort the call.
pub async fn fetch_all(
    api: &CloudApiClient,
    session: &Session,
    secrets: &ClientSecrets,
    parallelism: usize,
) -> CloudResult<Vec<(PasswordRecord, Uuid)>> {
    let keys = Arc::new(EnvelopeKeys::for_client(secrets)?);

    let resp = api
        .send_all(session)
        .await
        .map_err(|e| CloudError::Fetch(e.to_string()))?;
    let total = resp.passwords.len();

    let results: Vec<_> = stream::iter(resp.passwords.into_iter().enumerate())
        .map(|(index, (ep, id))| {
            let keys = Arc::clone(&keys);
            tokio::task::spawn_blocking(move || (index, open_entry(&keys, &ep, &id)))
        })
        .buffered(parallelism.max(1))
        .collect()
        .await;

    let mut records = Vec::with_capacity(total);
    for joined in results {
        match joined {
            Ok((_, Ok(entry))) => records.push(entry),
            Ok((index, Err(e))) => warn!("skipping record {index}: {e}"),
            Err(e) => warn!("decrypt worker failed: {e}"),
        }
    }

    if records.len() < total {
        warn!("decrypted {} of {total} records", records.len());
    } else {
        info!("decrypted {total} records");
    }
    Ok(records)
}

fn open_entry(
    keys: &EnvelopeKeys,
    ep: &EncryptedPassword,
    id: &str,
) -> CloudResult<(PasswordRecord, Uuid)> {
    let id = parse_uuid(id)?;
    let record = open_with_keys(ep, keys)?;
    Ok((record, id))
}

/// Encrypts `record` for storage and uploads it. Returns the record id the
/// server assigned.
pub async fn upload(
    api: &CloudApiClient,
    session: &Session,
    secrets: &ClientSecrets,
    record: &PasswordRecord,
) -> CloudResult<Uuid> {
    let ep = seal_for_upload(&secrets.ky_secret, record)?;
    let id = api
        .send(session, &ep)
        .await
        .map_err(|e| CloudError::Upload(e.to_string()))?;
    let id = parse_uuid(&id).map_err(|e| CloudError::Upload(e.to_string()))?;
    info!("uploaded record {id}");
    Ok(id)
}
