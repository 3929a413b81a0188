//! Deterministic binary codec for every sensitive structure.
//!
//! The format is untagged and not self-describing: both ends must agree on
//! which structure they are reading. Rules:
//!
//! - byte sequences and UTF-8 strings are an 8-byte little-endian length
//!   followed by the raw bytes
//! - optional fields are a presence byte (`0` absent, `1` present) followed by
//!   the value when present
//! - fixed-size fields (keys, UUIDs, secrets) are length-prefixed on encode,
//!   but the decoder ignores the prefix and consumes exactly the known size
//!
//! Decoding bounds-checks every length against the remaining input before
//! copying anything.

use crate::error::{TypesError, TypesResult};
use uuid::Uuid;

/// Width of every length prefix on the wire.
pub const LEN_PREFIX_SIZE: usize = 8;

const ABSENT: u8 = 0;
const PRESENT: u8 = 1;

/// Types with a fixed binary encoding.
pub trait Encode {
    fn encode(&self, enc: &mut Encoder);

    /// Encodes `self` into a fresh buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        self.encode(&mut enc);
        enc.into_bytes()
    }
}

/// Types that can be read back from their binary encoding.
pub trait Decode: Sized {
    fn decode(dec: &mut Decoder<'_>) -> TypesResult<Self>;

    /// Decodes a complete structure. Trailing bytes are rejected.
    fn from_bytes(bytes: &[u8]) -> TypesResult<Self> {
        let mut dec = Decoder::new(bytes);
        let value = Self::decode(&mut dec)?;
        dec.finish()?;
        Ok(value)
    }
}

/// Append-only output buffer.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn put_len(&mut self, len: usize) {
        self.buf.extend_from_slice(&(len as u64).to_le_bytes());
    }

    /// Writes a length-prefixed byte sequence.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.put_len(bytes.len());
        self.buf.extend_from_slice(bytes);
    }

    pub fn put_str(&mut self, value: &str) {
        self.put_bytes(value.as_bytes());
    }

    /// Writes a fixed-size field. Identical to [`Encoder::put_bytes`] on the
    /// wire; kept separate so call sites say which decode rule applies.
    pub fn put_fixed(&mut self, bytes: &[u8]) {
        self.put_bytes(bytes);
    }

    pub fn put_option<T: Encode>(&mut self, value: Option<&T>) {
        match value {
            Some(v) => {
                self.put_u8(PRESENT);
                v.encode(self);
            }
            None => self.put_u8(ABSENT),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over an input buffer.
#[derive(Debug)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> TypesResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(TypesError::malformed(format!(
                "need {n} bytes at offset {}, only {} remain",
                self.pos,
                self.remaining()
            )));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> TypesResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_raw_len(&mut self) -> TypesResult<u64> {
        let raw = self.take(LEN_PREFIX_SIZE)?;
        let mut prefix = [0u8; LEN_PREFIX_SIZE];
        prefix.copy_from_slice(raw);
        Ok(u64::from_le_bytes(prefix))
    }

    /// Reads a length prefix and checks it against the remaining input.
    pub fn read_len(&mut self) -> TypesResult<usize> {
        let raw = self.read_raw_len()?;
        if (raw as i64) < 0 {
            return Err(TypesError::malformed(format!("negative length {}", raw as i64)));
        }
        let len = usize::try_from(raw)
            .map_err(|_| TypesError::malformed(format!("length {raw} overflows usize")))?;
        if len > self.remaining() {
            return Err(TypesError::malformed(format!(
                "length {len} exceeds remaining {} bytes",
                self.remaining()
            )));
        }
        Ok(len)
    }

    pub fn read_bytes(&mut self) -> TypesResult<Vec<u8>> {
        let len = self.read_len()?;
        Ok(self.take(len)?.to_vec())
    }

    pub fn read_string(&mut self) -> TypesResult<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|e| TypesError::malformed(format!("invalid utf-8: {e}")))
    }

    /// Reads a fixed-size field: the prefix is consumed but not trusted,
    /// exactly `size` bytes follow.
    pub fn read_fixed(&mut self, size: usize) -> TypesResult<&'a [u8]> {
        let _declared = self.read_raw_len()?;
        self.take(size)
    }

    pub fn read_option<T: Decode>(&mut self) -> TypesResult<Option<T>> {
        match self.read_u8()? {
            ABSENT => Ok(None),
            PRESENT => T::decode(self).map(Some),
            other => Err(TypesError::malformed(format!("invalid presence byte {other}"))),
        }
    }

    /// Fails if any input is left unread.
    pub fn finish(&self) -> TypesResult<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(TypesError::malformed(format!("{n} trailing bytes"))),
        }
    }
}

impl Encode for String {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_str(self);
    }
}

impl Decode for String {
    fn decode(dec: &mut Decoder<'_>) -> TypesResult<Self> {
        dec.read_string()
    }
}

impl Encode for Vec<u8> {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_bytes(self);
    }
}

impl Decode for Vec<u8> {
    fn decode(dec: &mut Decoder<'_>) -> TypesResult<Self> {
        dec.read_bytes()
    }
}

impl Encode for Uuid {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_fixed(self.as_bytes());
    }
}

impl Decode for Uuid {
    fn decode(dec: &mut Decoder<'_>) -> TypesResult<Self> {
        let raw = dec.read_fixed(16)?;
        Uuid::from_slice(raw).map_err(|e| TypesError::malformed(e.to_string()))
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_option(self.as_ref());
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(dec: &mut Decoder<'_>) -> TypesResult<Self> {
        dec.read_option()
    }
}
