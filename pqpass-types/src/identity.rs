//! Client identity and secret key material.
//!
//! [`ClientEx`] is the unit persisted to the key file. Losing it means losing
//! access to the vault; nothing else can reconstruct the secret keys.

use crate::codec::{Decode, Decoder, Encode, Encoder};
use crate::error::{TypesError, TypesResult};
use crate::keys::{DiPublic, DiSecret, KyPublic, KySecret, SessionSecret};
use uuid::Uuid;

/// Public identity registered with the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientIdentity {
    pub email: String,
    id: Option<Uuid>,
    pub ky_public: KyPublic,
    pub di_public: DiPublic,
}

impl ClientIdentity {
    /// Identity before the server has assigned an id.
    pub fn unregistered(email: impl Into<String>, ky_public: KyPublic, di_public: DiPublic) -> Self {
        Self {
            email: email.into(),
            id: None,
            ky_public,
            di_public,
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// Records the server-assigned id. Fails if a different id is already
    /// set; use [`ClientIdentity::reissue`] to replace one.
    pub fn assign_id(&mut self, id: Uuid) -> TypesResult<()> {
        match self.id {
            Some(existing) if existing != id => Err(TypesError::IdentityAlreadyAssigned),
            _ => {
                self.id = Some(id);
                Ok(())
            }
        }
    }

    /// Explicit re-issuance: replaces the id and public keys in one step.
    pub fn reissue(self, id: Uuid, ky_public: KyPublic, di_public: DiPublic) -> Self {
        Self {
            email: self.email,
            id: Some(id),
            ky_public,
            di_public,
        }
    }
}

impl Encode for ClientIdentity {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_str(&self.email);
        enc.put_option(self.id.as_ref());
        self.ky_public.encode(enc);
        self.di_public.encode(enc);
    }
}

impl Decode for ClientIdentity {
    fn decode(dec: &mut Decoder<'_>) -> TypesResult<Self> {
        Ok(Self {
            email: dec.read_string()?,
            id: dec.read_option()?,
            ky_public: KyPublic::decode(dec)?,
            di_public: DiPublic::decode(dec)?,
        })
    }
}

/// Both keypairs plus the session secret from the last handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientSecrets {
    pub ky_public: KyPublic,
    pub ky_secret: KySecret,
    pub di_public: DiPublic,
    pub di_secret: DiSecret,
    pub secret: Option<SessionSecret>,
}

impl ClientSecrets {
    /// Replaces the session secret; the previous one is zeroized on drop.
    pub fn set_secret(&mut self, secret: SessionSecret) {
        self.secret = Some(secret);
    }

    pub fn clear_secret(&mut self) {
        self.secret = None;
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }
}

impl Encode for ClientSecrets {
    fn encode(&self, enc: &mut Encoder) {
        self.ky_public.encode(enc);
        self.ky_secret.encode(enc);
        self.di_public.encode(enc);
        self.di_secret.encode(enc);
        enc.put_option(self.secret.as_ref());
    }
}

impl Decode for ClientSecrets {
    fn decode(dec: &mut Decoder<'_>) -> TypesResult<Self> {
        Ok(Self {
            ky_public: KyPublic::decode(dec)?,
            ky_secret: KySecret::decode(dec)?,
            di_public: DiPublic::decode(dec)?,
            di_secret: DiSecret::decode(dec)?,
            secret: dec.read_option()?,
        })
    }
}

/// Secrets paired with the identity they belong to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientEx {
    pub secrets: ClientSecrets,
    pub identity: ClientIdentity,
}

impl ClientEx {
    pub fn new(secrets: ClientSecrets, identity: ClientIdentity) -> Self {
        Self { secrets, identity }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.identity.id()
    }
}

impl Encode for ClientEx {
    fn encode(&self, enc: &mut Encoder) {
        self.secrets.encode(enc);
        self.identity.encode(enc);
    }
}

impl Decode for ClientEx {
    fn decode(dec: &mut Decoder<'_>) -> TypesResult<Self> {
        Ok(Self {
            secrets: ClientSecrets::decode(dec)?,
            identity: ClientIdentity::decode(dec)?,
        })
    }
}
