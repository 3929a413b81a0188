//! Local storage for pqpass.
//!
//! - [`PasswordCache`]: a SQLite-backed cache of decrypted records,
//!   re-encrypted at rest under a device-local key
//! - [`keyfile`]: persistence of the serialized `ClientEx`
//!
//! The cache is an explicit handle. Open it once and pass it by reference;
//! there is no process-wide instance.

mod cache;
mod error;
pub mod keyfile;

pub use cache::PasswordCache;
pub use error::{VaultError, VaultResult};
