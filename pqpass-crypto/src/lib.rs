//! Cryptography for pqpass.
//!
//! Provides:
//! - ML-KEM-1024 key encapsulation ([`kem`])
//! - ML-DSA-87 signatures ([`sign`])
//! - XChaCha20-Poly1305 authenticated encryption ([`cipher`])
//! - BLAKE3 key derivation ([`hash`])
//! - the two-layer password envelope ([`envelope`])
//! - RFC 6238 one-time passwords ([`totp`])
//!
//! # Key usage
//!
//! The KEM secret key (`kySecret`) is both a decapsulation key and, through
//! `hash32`, the inner-layer envelope key. The session secret recovered at
//! handshake time keys the outer layer of envelopes delivered by the server.

pub mod cipher;
pub mod envelope;
mod error;
pub mod hash;
pub mod kem;
pub mod keys;
pub mod sign;
pub mod totp;

pub use cipher::{KEY_SIZE, NONCE_SIZE, Sealed, SymmetricKey, TAG_SIZE, decrypt, encrypt, generate_random_key};
pub use envelope::{
    EnvelopeKeys, open_password, open_share, open_with_keys, seal_for_share, seal_for_upload,
    seal_record, wrap_for_transit, wrap_outer,
};
pub use error::{CryptoError, CryptoResult};
pub use hash::{derive_key, fingerprint, hash32};
pub use keys::generate_client_secrets;
