//! Chunk Module
//!
//! Splitting oversized payloads into physical entries and naming them.
//!
//! ## Responsibilities
//! - Generate lexically ordered chunk suffixes
//! - Build chunk keys from a logical key
//! - Slice a payload into bounded chunks
//!
//! ## Chunk Keys
//! A chunked value stored under `key` lives at `key + [suffix(i)]`:
//! ```text
//! chunk 0  -> ['original', 'key', 'a']
//! chunk 1  -> ['original', 'key', 'b']
//! ...
//! chunk 25 -> ['original', 'key', 'z']
//! chunk 26 -> ['original', 'key', 'za']
//! ...
//! chunk 51 -> ['original', 'key', 'zz']
//! chunk 52 -> ['original', 'key', 'zza']
//! ```
//! An ascending prefix scan over `key` therefore yields chunks in index order.

mod split;
mod suffix;

pub use split::{chunk_count, split, Chunks};
pub use suffix::{chunk_key, suffix, ALPHABET};
