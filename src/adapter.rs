//! Adapter contract
//!
//! The hierarchical key-value interface callers (e.g. a document sync
//! engine) program against.

use bytes::Bytes;

use crate::error::Result;
use crate::key::StorageKey;

/// One physical entry surfaced by a range scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: StorageKey,
    pub data: Bytes,
}

impl Entry {
    pub fn new(key: StorageKey, data: impl Into<Bytes>) -> Self {
        Self {
            key,
            data: data.into(),
        }
    }
}

/// Load/save/remove single values and scan/remove key ranges
///
/// Every method reports backend failures as `Err`; "no data" is `Ok(None)` or
/// an empty `Vec`, never an error.
pub trait StorageAdapter {
    /// The value stored under `key`, reassembled if it was chunked
    fn load(&self, key: &StorageKey) -> Result<Option<Bytes>>;

    /// Store `data` under `key`, replacing any previous value
    fn save(&self, key: &StorageKey, data: Bytes) -> Result<()>;

    /// Remove the value under `key`. Removing an absent key succeeds.
    fn remove(&self, key: &StorageKey) -> Result<()>;

    /// Every physical entry whose key equals or extends `prefix`, in
    /// ascending key order
    ///
    /// Chunked values come back as their individual chunks, not reassembled.
    fn load_range(&self, prefix: &StorageKey) -> Result<Vec<Entry>>;

    /// Delete every physical entry whose key equals or extends `prefix`
    fn remove_range(&self, prefix: &StorageKey) -> Result<()>;
}
