//! Time-based one-time passwords (RFC 6238).
//!
//! Code generation is a pure function of the parameters and a Unix time;
//! refreshing a displayed code is the caller's concern.

use crate::error::{CryptoError, CryptoResult};
use data_encoding::Specification;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const DEFAULT_PERIOD: u64 = 30;
pub const DEFAULT_DIGITS: u32 = 6;

/// HMAC digest used for code generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TotpAlgorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl TotpAlgorithm {
    fn parse(name: &str) -> CryptoResult<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            "SHA512" => Ok(Self::Sha512),
            other => Err(CryptoError::Otp(format!("unsupported algorithm {other}"))),
        }
    }
}

/// Everything needed to compute a code.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct TotpParams {
    pub secret: Vec<u8>,
    #[zeroize(skip)]
    pub period: u64,
    #[zeroize(skip)]
    pub digits: u32,
    #[zeroize(skip)]
    pub algorithm: TotpAlgorithm,
    #[zeroize(skip)]
    pub issuer: Option<String>,
    #[zeroize(skip)]
    pub label: Option<String>,
}

impl fmt::Debug for TotpParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TotpParams")
            .field("secret", &"[REDACTED]")
            .field("period", &self.period)
            .field("digits", &self.digits)
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("label", &self.label)
            .finish()
    }
}

impl TotpParams {
    /// Parameters with the usual defaults (30 s, 6 digits, SHA1).
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            period: DEFAULT_PERIOD,
            digits: DEFAULT_DIGITS,
            algorithm: TotpAlgorithm::Sha1,
            issuer: None,
            label: None,
        }
    }

    /// Parses an `otpauth://totp/<label>?secret=...` URI.
    pub fn from_uri(uri: &str) -> CryptoResult<Self> {
        let rest = uri
            .strip_prefix("otpauth://")
            .ok_or_else(|| CryptoError::Otp("not an otpauth URI".into()))?;
        let (kind, rest) = rest
            .split_once('/')
            .ok_or_else(|| CryptoError::Otp("missing otp type".into()))?;
        if !kind.eq_ignore_ascii_case("totp") {
            return Err(CryptoError::Otp(format!("unsupported otp type {kind}")));
        }
        let (label, query) = rest.split_once('?').unwrap_or((rest, ""));

        let mut params = Self::new(Vec::new());
        if !label.is_empty() {
            params.label = Some(percent_decode(label)?);
        }

        let mut secret = None;
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = percent_decode(value)?;
            match key.to_ascii_lowercase().as_str() {
                "secret" => secret = Some(decode_base32(&value)?),
                "period" => {
                    params.period = value
                        .parse()
                        .map_err(|_| CryptoError::Otp(format!("invalid period {value}")))?
                }
                "digits" => {
                    params.digits = value
                        .parse()
                        .map_err(|_| CryptoError::Otp(format!("invalid digits {value}")))?
                }
                "algorithm" => params.algorithm = TotpAlgorithm::parse(&value)?,
                "issuer" => params.issuer = Some(value),
                _ => {}
            }
        }

        params.secret = secret.ok_or_else(|| CryptoError::Otp("missing secret".into()))?;
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> CryptoResult<()> {
        if self.period == 0 {
            return Err(CryptoError::Otp("period must be positive".into()));
        }
        if !(1..=10).contains(&self.digits) {
            return Err(CryptoError::Otp(format!("digits out of range: {}", self.digits)));
        }
        if self.secret.is_empty() {
            return Err(CryptoError::Otp("empty secret".into()));
        }
        Ok(())
    }
}

/// Computes the code for `unix_time`, zero-padded to `digits`.
pub fn generate(params: &TotpParams, unix_time: u64) -> CryptoResult<String> {
    params.validate()?;
    let counter = (unix_time / params.period).to_be_bytes();

    let digest = match params.algorithm {
        TotpAlgorithm::Sha1 => hmac_digest::<Hmac<Sha1>>(&params.secret, &counter)?,
        TotpAlgorithm::Sha256 => hmac_digest::<Hmac<Sha256>>(&params.secret, &counter)?,
        TotpAlgorithm::Sha512 => hmac_digest::<Hmac<Sha512>>(&params.secret, &counter)?,
    };

    // Dynamic truncation.
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    let code = u64::from(binary) % 10u64.pow(params.digits);
    Ok(format!("{code:0width$}", width = params.digits as usize))
}

/// Seconds until the code for `unix_time` rolls over.
pub fn seconds_remaining(params: &TotpParams, unix_time: u64) -> u64 {
    if params.period == 0 {
        return 0;
    }
    params.period - unix_time % params.period
}

fn hmac_digest<M: Mac + hmac::digest::KeyInit>(key: &[u8], message: &[u8]) -> CryptoResult<Vec<u8>> {
    let mut mac = <M as hmac::digest::KeyInit>::new_from_slice(key)
        .map_err(|e| CryptoError::Otp(e.to_string()))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn percent_decode(value: &str) -> CryptoResult<String> {
    urlencoding::decode(value)
        .map(|s| s.into_owned())
        .map_err(|e| CryptoError::Otp(format!("invalid percent-encoding: {e}")))
}

/// RFC 4648 base32, case-insensitive, padding and whitespace ignored.
fn decode_base32(input: &str) -> CryptoResult<Vec<u8>> {
    let mut alphabet = Specification::new();
    alphabet.symbols.push_str("ABCDEFGHIJKLMNOPQRSTUVWXYZ234567");
    alphabet.translate.from.push_str("abcdefghijklmnopqrstuvwxyz");
    alphabet.translate.to.push_str("ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    alphabet.ignore.push_str("= \t\r\n");
    alphabet.check_trailing_bits = false;
    let base32 = alphabet
        .encoding()
        .map_err(|e| CryptoError::Otp(format!("base32 alphabet: {e}")))?;
    base32
        .decode(input.as_bytes())
        .map_err(|e| CryptoError::Otp(format!("invalid base32 secret: {e}")))
}
