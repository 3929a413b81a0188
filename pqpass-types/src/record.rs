//! Plaintext password records.

use crate::codec::{Decode, Decoder, Encode, Encoder};
use crate::error::TypesResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// A single vault entry.
///
/// `password` and `username` are required; every other field is
/// independently optional. `otp` holds an `otpauth://` URI.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct PasswordRecord {
    pub password: String,
    pub app_id: Option<String>,
    pub username: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub otp: Option<String>,
}

impl PasswordRecord {
    pub fn new(password: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            username: username.into(),
            ..Self::default()
        }
    }
}

impl fmt::Debug for PasswordRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordRecord")
            .field("password", &"[REDACTED]")
            .field("app_id", &self.app_id)
            .field("username", &self.username)
            .field("description", &self.description)
            .field("url", &self.url)
            .field("otp", &self.otp.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Encode for PasswordRecord {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_str(&self.password);
        enc.put_option(self.app_id.as_ref());
        enc.put_str(&self.username);
        enc.put_option(self.description.as_ref());
        enc.put_option(self.url.as_ref());
        enc.put_option(self.otp.as_ref());
    }
}

impl Decode for PasswordRecord {
    fn decode(dec: &mut Decoder<'_>) -> TypesResult<Self> {
        Ok(Self {
            password: dec.read_string()?,
            app_id: dec.read_option()?,
            username: dec.read_string()?,
            description: dec.read_option()?,
            url: dec.read_option()?,
            otp: dec.read_option()?,
        })
    }
}
