//! Fixed-size key material.
//!
//! Sizes are protocol invariants: construction from a slice of any other
//! length fails, and the codec always consumes exactly the declared size.

use crate::codec::{Decode, Decoder, Encode, Encoder};
use crate::error::{TypesError, TypesResult};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// ML-KEM-1024 public (encapsulation) key size.
pub const KY_PUBLIC_LEN: usize = 1568;
/// ML-KEM-1024 secret (decapsulation) key size.
pub const KY_SECRET_LEN: usize = 3168;
/// ML-DSA-87 public (verifying) key size.
pub const DI_PUBLIC_LEN: usize = 2592;
/// ML-DSA-87 secret (signing) key size.
pub const DI_SECRET_LEN: usize = 4896;
/// Session secret / KEM shared secret size.
pub const SECRET_LEN: usize = 32;

macro_rules! key_material {
    ($(#[$doc:meta])* $name:ident, $len:expr) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(Box<[u8; $len]>);

        impl $name {
            pub const LEN: usize = $len;

            pub fn from_array(bytes: [u8; $len]) -> Self {
                Self(Box::new(bytes))
            }

            pub fn from_slice(bytes: &[u8]) -> TypesResult<Self> {
                let array = <[u8; $len]>::try_from(bytes).map_err(|_| {
                    TypesError::MalformedInput(format!(
                        "{} must be {} bytes, got {}",
                        stringify!($name),
                        $len,
                        bytes.len()
                    ))
                })?;
                Ok(Self(Box::new(array)))
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                self.0.as_slice()
            }
        }

        impl Encode for $name {
            fn encode(&self, enc: &mut Encoder) {
                enc.put_fixed(self.0.as_slice());
            }
        }

        impl Decode for $name {
            fn decode(dec: &mut Decoder<'_>) -> TypesResult<Self> {
                Self::from_slice(dec.read_fixed($len)?)
            }
        }
    };
}

macro_rules! secret_material {
    ($(#[$doc:meta])* $name:ident, $len:expr) => {
        key_material!($(#[$doc])* $name, $len);

        impl Zeroize for $name {
            fn zeroize(&mut self) {
                self.0.as_mut_slice().zeroize();
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                self.zeroize();
            }
        }

        impl ZeroizeOnDrop for $name {}

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}([REDACTED; {}])", stringify!($name), $len)
            }
        }
    };
}

key_material!(
    /// ML-KEM-1024 encapsulation key.
    KyPublic,
    KY_PUBLIC_LEN
);

secret_material!(
    /// ML-KEM-1024 decapsulation key. Also the key-derivation input for the
    /// inner envelope layer.
    KySecret,
    KY_SECRET_LEN
);

key_material!(
    /// ML-DSA-87 verifying key.
    DiPublic,
    DI_PUBLIC_LEN
);

secret_material!(
    /// ML-DSA-87 signing key.
    DiSecret,
    DI_SECRET_LEN
);

secret_material!(
    /// 32-byte secret recovered by KEM decapsulation: the session secret
    /// after a handshake, or the wrapping secret of a share.
    SessionSecret,
    SECRET_LEN
);

impl fmt::Debug for KyPublic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KyPublic({:02x?}..)", &self.0[..4])
    }
}

impl fmt::Debug for DiPublic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiPublic({:02x?}..)", &self.0[..4])
    }
}
