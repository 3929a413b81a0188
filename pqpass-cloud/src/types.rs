//! Wire types for the server API.

use pqpass_types::{EncryptedPassword, ShareRecord, ShareStatus};
use serde::{Deserialize, Serialize};

/// Public key as the server encodes it: `{"bytes": [..]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBytes {
    pub bytes: Vec<u8>,
}

impl From<&[u8]> for KeyBytes {
    fn from(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    /// Always null on registration; the server assigns the id.
    pub id: Option<String>,
    pub ky_p: KeyBytes,
    pub di_p: KeyBytes,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub id: String,
    pub email: String,
    pub ky_p: KeyBytes,
    pub di_p: KeyBytes,
}

/// Body of `send_all/{uuid}`: envelopes paired with their record ids.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SendAllResponse {
    pub passwords: Vec<(EncryptedPassword, String)>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateShareRequest {
    pub recipient: String,
    pub kem_ciphertext: Vec<u8>,
    pub password: EncryptedPassword,
}

/// Body of `shared/{uuid}`: shares addressed to the caller with their ids.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SharedResponse {
    pub shares: Vec<(ShareRecord, String)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareStatusRequest {
    pub status: ShareStatus,
}
