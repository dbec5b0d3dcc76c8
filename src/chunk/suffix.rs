//! Chunk suffix generator
//!
//! `suffix(i)` is the last alphabet letter repeated `i / 26` times followed by
//! the letter at `i % 26`. Longer runs of `z` sort after every shorter run,
//! and within one run length the trailing letter grows with the index, so the
//! suffixes are strictly increasing for every index.

use crate::key::StorageKey;

/// Alphabet the suffixes are drawn from, in ascending byte order
pub const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Suffix for the chunk at `index`
pub fn suffix(index: usize) -> String {
    let base = ALPHABET.len();
    let last = ALPHABET[base - 1] as char;
    let run = index / base;

    let mut out = String::with_capacity(run + 1);
    out.extend(std::iter::repeat(last).take(run));
    out.push(ALPHABET[index % base] as char);
    out
}

/// Physical key of chunk `index` of the value stored under `key`
pub fn chunk_key(key: &StorageKey, index: usize) -> StorageKey {
    key.child(suffix(index))
}
