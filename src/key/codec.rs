//! Order-preserving byte encoding for [`StorageKey`]
//!
//! Each segment is escaped and terminated with `0x00`:
//!
//! - `0x00` → `0x01 0x01`
//! - `0x01` → `0x01 0x02`
//! - All other bytes unchanged
//! - Terminated with `0x00`
//!
//! The terminator is the lowest byte value, so an encoded key sorts before
//! every key that extends it, and the byte order of two encodings matches the
//! segment-wise order of the keys. Because every segment carries its own
//! terminator, a segment-wise prefix is also a byte prefix and nothing else
//! is: `[A]` encodes to `A\0`, which is a prefix of `A\0B\0` but not of `AB\0`.

use bytes::{BufMut, Bytes, BytesMut};

use super::StorageKey;
use crate::error::{ChunkKvError, Result};

/// Closes every segment; the lowest byte value
const TERMINATOR: u8 = 0x00;

/// Introduces a two-byte escape for `TERMINATOR` or itself
const ESCAPE: u8 = 0x01;

/// Second byte of an escaped `TERMINATOR`
const ESCAPED_TERMINATOR: u8 = 0x01;

/// Second byte of an escaped `ESCAPE`
const ESCAPED_ESCAPE: u8 = 0x02;

/// Encode a key into a freshly allocated buffer
pub fn encode(key: &StorageKey) -> Bytes {
    let mut buf = BytesMut::new();
    encode_into(key, &mut buf);
    buf.freeze()
}

/// Encode a key, appending to `buf`
pub fn encode_into(key: &StorageKey, buf: &mut BytesMut) {
    for segment in key.segments() {
        let raw = segment.as_bytes();
        buf.reserve(raw.len() + 1);
        for &byte in raw {
            match byte {
                TERMINATOR => buf.put_slice(&[ESCAPE, ESCAPED_TERMINATOR]),
                ESCAPE => buf.put_slice(&[ESCAPE, ESCAPED_ESCAPE]),
                _ => buf.put_u8(byte),
            }
        }
        buf.put_u8(TERMINATOR);
    }
}

/// Decode a full encoded key
///
/// # Errors
///
/// Returns [`ChunkKvError::InvalidKey`] if:
/// - an escape is cut short or names an unknown byte
/// - the last segment is missing its terminator
/// - a segment is not valid UTF-8
pub fn decode(mut buf: &[u8]) -> Result<StorageKey> {
    let mut segments = Vec::new();
    while !buf.is_empty() {
        let raw = next_segment(&mut buf)?;
        let segment = String::from_utf8(raw).map_err(|e| {
            ChunkKvError::InvalidKey(format!("segment {} is not UTF-8: {}", segments.len(), e))
        })?;
        segments.push(segment);
    }
    Ok(StorageKey::from(segments))
}

/// Split the first segment off `buf`, unescaping it
fn next_segment(buf: &mut &[u8]) -> Result<Vec<u8>> {
    let mut segment = Vec::new();
    loop {
        let byte = take_byte(buf, "encoded key ends inside a segment")?;
        match byte {
            TERMINATOR => return Ok(segment),
            ESCAPE => {
                let escaped = take_byte(buf, "encoded key ends after an escape byte")?;
                segment.push(unescape(escaped)?);
            }
            _ => segment.push(byte),
        }
    }
}

fn take_byte(buf: &mut &[u8], missing: &str) -> Result<u8> {
    let (&byte, rest) = buf
        .split_first()
        .ok_or_else(|| ChunkKvError::InvalidKey(missing.to_string()))?;
    *buf = rest;
    Ok(byte)
}

fn unescape(byte: u8) -> Result<u8> {
    match byte {
        ESCAPED_TERMINATOR => Ok(TERMINATOR),
        ESCAPED_ESCAPE => Ok(ESCAPE),
        other => Err(ChunkKvError::InvalidKey(format!(
            "unknown escape 0x{:02x} in encoded key",
            other
        ))),
    }
}
