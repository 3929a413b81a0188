//! Error types for the data model and codec.

use crate::share::ShareStatus;
use thiserror::Error;

/// Result type for codec and data-model operations.
pub type TypesResult<T> = Result<T, TypesError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("invalid uuid: {0}")]
    InvalidUuid(String),

    #[error("share cannot move from {from:?} to {to:?}")]
    InvalidShareTransition { from: ShareStatus, to: ShareStatus },

    #[error("identity already has a server-assigned id")]
    IdentityAlreadyAssigned,
}

impl TypesError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }
}
