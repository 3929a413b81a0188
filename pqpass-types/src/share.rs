//! Shared password records and their status lifecycle.
//!
//! `Pending` moves to either `Accepted` or `Rejected`; both are terminal.
//! Sharing again after a rejection needs a new [`ShareRecord`].

use crate::codec::{Decode, Decoder, Encode, Encoder};
use crate::envelope::EncryptedPassword;
use crate::error::{TypesError, TypesResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ShareStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ShareStatus::Pending)
    }

    fn to_byte(self) -> u8 {
        match self {
            ShareStatus::Pending => 0,
            ShareStatus::Accepted => 1,
            ShareStatus::Rejected => 2,
        }
    }

    fn from_byte(byte: u8) -> TypesResult<Self> {
        match byte {
            0 => Ok(ShareStatus::Pending),
            1 => Ok(ShareStatus::Accepted),
            2 => Ok(ShareStatus::Rejected),
            other => Err(TypesError::malformed(format!("invalid share status {other}"))),
        }
    }
}

/// A password envelope shared with another identity.
///
/// `kem_ciphertext` is the encapsulation against the recipient's public key;
/// decapsulating it yields the secret that opens `envelope`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub kem_ciphertext: Vec<u8>,
    #[serde(rename = "password")]
    pub envelope: EncryptedPassword,
    status: ShareStatus,
}

impl ShareRecord {
    /// New share, always starting out pending.
    pub fn new(kem_ciphertext: Vec<u8>, envelope: EncryptedPassword) -> Self {
        Self {
            kem_ciphertext,
            envelope,
            status: ShareStatus::Pending,
        }
    }

    pub fn status(&self) -> ShareStatus {
        self.status
    }

    pub fn accept(&mut self) -> TypesResult<()> {
        self.transition(ShareStatus::Accepted)
    }

    pub fn reject(&mut self) -> TypesResult<()> {
        self.transition(ShareStatus::Rejected)
    }

    fn transition(&mut self, to: ShareStatus) -> TypesResult<()> {
        if self.status.is_terminal() {
            return Err(TypesError::InvalidShareTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

impl Encode for ShareRecord {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_bytes(&self.kem_ciphertext);
        self.envelope.encode(enc);
        enc.put_u8(self.status.to_byte());
    }
}

impl Decode for ShareRecord {
    fn decode(dec: &mut Decoder<'_>) -> TypesResult<Self> {
        Ok(Self {
            kem_ciphertext: dec.read_bytes()?,
            envelope: EncryptedPassword::decode(dec)?,
            status: ShareStatus::from_byte(dec.read_u8()?)?,
        })
    }
}
