//! Client error types.

use pqpass_crypto::CryptoError;
use pqpass_types::TypesError;
use pqpass_vault::VaultError;
use std::fmt;
use thiserror::Error;

/// Result type for client operations.
pub type CloudResult<T> = Result<T, CloudError>;

/// Step of the login handshake that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandshakeStage {
    Challenge,
    Sign,
    Verify,
    Token,
    Sync,
    Decapsulate,
}

impl fmt::Display for HandshakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandshakeStage::Challenge => "challenge",
            HandshakeStage::Sign => "sign",
            HandshakeStage::Verify => "verify",
            HandshakeStage::Token => "token",
            HandshakeStage::Sync => "sync",
            HandshakeStage::Decapsulate => "decapsulate",
        };
        f.write_str(name)
    }
}

/// Errors that can occur talking to the server.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("registration failed: {0}")]
    RegistrationFailed(String),

    #[error("authentication failed at {stage} stage: {reason}")]
    AuthenticationFailed { stage: HandshakeStage, reason: String },

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("share operation failed: {0}")]
    Share(String),

    #[error("a handshake is already in progress")]
    HandshakeInProgress,

    #[error("authentication required")]
    AuthRequired,

    #[error("no registered identity; register or load a key file first")]
    NoIdentity,

    #[error("API request failed: {0}")]
    Api(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("codec error: {0}")]
    Types(#[from] TypesError),

    #[error("vault error: {0}")]
    Vault(#[from] VaultError),
}

impl CloudError {
    pub(crate) fn auth(stage: HandshakeStage, reason: impl fmt::Display) -> Self {
        CloudError::AuthenticationFailed {
            stage,
            reason: reason.to_string(),
        }
    }
}
