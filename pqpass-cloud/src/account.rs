//! Account creation.

use crate::api_client::CloudApiClient;
use crate::error::{CloudError, CloudResult};
use crate::types::{CreateUserRequest, KeyBytes};
use pqpass_crypto::{fingerprint, generate_client_secrets};
use pqpass_types::{ClientEx, ClientIdentity, DiPublic, Encode, KyPublic, parse_uuid};
use std::fmt;
use tracing::{info, warn};
use zeroize::Zeroizing;

/// Result of a successful registration.
pub struct Registration {
    pub client: ClientEx,
    /// Codec encoding of `client`, ready to write to the key file.
    pub key_file: Zeroizing<Vec<u8>>,
}

fn failed(e: impl fmt::Display) -> CloudError {
    CloudError::RegistrationFailed(e.to_string())
}

/// Generates fresh keys and registers them under `email`.
///
/// Every failure, local or remote, surfaces as `RegistrationFailed`.
pub async fn create_account(api: &CloudApiClient, email: &str) -> CloudResult<Registration> {
    let secrets = generate_client_secrets().map_err(failed)?;
    let req = CreateUserRequest {
        email: email.to_string(),
        id: None,
        ky_p: KeyBytes::from(secrets.ky_public.as_ref()),
        di_p: KeyBytes::from(secrets.di_public.as_ref()),
    };

    let resp = api.create_user(&req).await.map_err(failed)?;
    let id = parse_uuid(&resp.id).map_err(failed)?;
    let ky_public = KyPublic::from_slice(&resp.ky_p.bytes).map_err(failed)?;
    let di_public = DiPublic::from_slice(&resp.di_p.bytes).map_err(failed)?;

    let identity = ClientIdentity::unregistered(
        email,
        secrets.ky_public.clone(),
        secrets.di_public.clone(),
    );
    let identity = if ky_public != secrets.ky_public || di_public != secrets.di_public {
        warn!(
            "server re-issued public keys for {id}: kem {} -> {}, sig {} -> {}",
            fingerprint(secrets.ky_public.as_ref()),
            fingerprint(ky_public.as_ref()),
            fingerprint(secrets.di_public.as_ref()),
            fingerprint(di_public.as_ref()),
        );
        identity.reissue(id, ky_public, di_public)
    } else {
        let mut identity = identity;
        identity.assign_id(id).map_err(failed)?;
        identity
    };

    let client = ClientEx::new(secrets, identity);
    let key_file = Zeroizing::new(client.to_bytes());
    info!("registered {email} as {id}");
    Ok(Registration { client, key_file })
}
