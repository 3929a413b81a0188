//! UUID text handling.
//!
//! Canonical text is lowercase hyphenated `8-4-4-4-12`, which is what
//! `Uuid`'s `Display` produces. Parsing is stricter than `Uuid::parse_str`:
//! hyphens may appear anywhere (or nowhere), but what remains must be exactly
//! 32 hex digits.

use crate::error::{TypesError, TypesResult};
use uuid::Uuid;

/// Parses a UUID from text, validating length before parsing.
pub fn parse_uuid(text: &str) -> TypesResult<Uuid> {
    let digits: String = text.chars().filter(|c| *c != '-').collect();
    if digits.len() != 32 {
        return Err(TypesError::InvalidUuid(format!(
            "expected 32 hex digits, got {} in {text:?}",
            digits.len()
        )));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(TypesError::InvalidUuid(format!("non-hex character in {text:?}")));
    }
    Uuid::try_parse(&digits).map_err(|e| TypesError::InvalidUuid(e.to_string()))
}

/// Canonical lowercase hyphenated form.
pub fn format_uuid(id: &Uuid) -> String {
    id.hyphenated().to_string()
}
