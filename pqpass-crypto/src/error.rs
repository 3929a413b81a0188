//! Error types for cryptographic operations.

use pqpass_types::TypesError;
use thiserror::Error;

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur during cryptographic operations.
///
/// Primitive failures (`DecapFailure`, `SignFailure`, `AuthFailure`) are
/// always fatal to the operation that produced them.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("KEM decapsulation failed: {0}")]
    DecapFailure(String),

    #[error("KEM encapsulation failed: {0}")]
    Encapsulation(String),

    #[error("signing failed: {0}")]
    SignFailure(String),

    #[error("authentication tag mismatch (wrong key or tampered data)")]
    AuthFailure,

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("envelope decryption failed at {layer} layer")]
    DecryptionFailed { layer: &'static str },

    #[error("decrypted record is malformed: {0}")]
    MalformedRecord(#[source] TypesError),

    #[error("envelope has no outer nonce; transit layer was never applied")]
    MissingOuterNonce,

    #[error("envelope already carries an outer layer")]
    AlreadyWrapped,

    #[error("no session secret; complete a handshake first")]
    MissingSessionSecret,

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("one-time password error: {0}")]
    Otp(String),
}
