//! Encrypted password envelope as stored and transmitted.

use crate::codec::{Decode, Decoder, Encode, Encoder};
use crate::error::TypesResult;
use serde::{Deserialize, Serialize};

/// A double-encrypted password record.
///
/// `nonce` belongs to the inner layer, `nonce2` to the outer (transit) layer.
/// `nonce2 == None` means only the inner layer has been applied and the
/// envelope cannot be fully decrypted yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPassword {
    pub nonce: Vec<u8>,
    pub nonce2: Option<Vec<u8>>,
    pub ciphertext: Vec<u8>,
}

impl EncryptedPassword {
    /// True once the outer layer has been applied.
    pub fn is_wrapped(&self) -> bool {
        self.nonce2.is_some()
    }
}

impl Encode for EncryptedPassword {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_bytes(&self.nonce);
        enc.put_option(self.nonce2.as_ref());
        enc.put_bytes(&self.ciphertext);
    }
}

impl Decode for EncryptedPassword {
    fn decode(dec: &mut Decoder<'_>) -> TypesResult<Self> {
        Ok(Self {
            nonce: dec.read_bytes()?,
            nonce2: dec.read_option()?,
            ciphertext: dec.read_bytes()?,
        })
    }
}
