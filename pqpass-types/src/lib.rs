//! Data model and binary codec for pqpass.
//!
//! Every sensitive structure (key material, identities, password records,
//! envelopes, shares) has a deterministic, length-prefixed little-endian
//! encoding defined in [`codec`]. The encoding is the key-file format and
//! must stay byte-for-byte stable.

pub mod codec;
pub mod envelope;
mod error;
pub mod id;
pub mod identity;
pub mod keys;
pub mod record;
pub mod share;

pub use codec::{Decode, Decoder, Encode, Encoder};
pub use envelope::EncryptedPassword;
pub use error::{TypesError, TypesResult};
pub use id::{format_uuid, parse_uuid};
pub use identity::{ClientEx, ClientIdentity, ClientSecrets};
pub use keys::{
    DI_PUBLIC_LEN, DI_SECRET_LEN, DiPublic, DiSecret, KY_PUBLIC_LEN, KY_SECRET_LEN, KyPublic,
    KySecret, SECRET_LEN, SessionSecret,
};
pub use record::PasswordRecord;
pub use share::{ShareRecord, ShareStatus};
pub use uuid::Uuid;
