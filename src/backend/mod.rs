//! Backend Module
//!
//! The backing key-value store the adapter writes physical entries to.
//!
//! ## Responsibilities
//! - Atomic single-key get/set/delete
//! - Ordered prefix scan
//! - Enforce the per-entry size limit
//!
//! ## Implementations
//! - [`MemoryBackend`]: ordered map behind a lock, for tests and caches
//! - [`LogBackend`]: in-memory index made durable by a write-ahead log

mod log;
mod memory;

pub use log::LogBackend;
pub use memory::MemoryBackend;

use std::sync::Arc;

use bytes::Bytes;

use crate::error::Result;
use crate::key::StorageKey;

/// One physical entry as returned by [`KvBackend::scan`]
pub type ScanEntry = (StorageKey, Bytes);

/// Capabilities the chunking adapter needs from a backing store
///
/// Implementations must be safe to call from several threads at once: the
/// adapter dispatches independent writes in parallel.
pub trait KvBackend: Send + Sync {
    /// Read the entry stored at exactly `key`
    fn get(&self, key: &StorageKey) -> Result<Option<Bytes>>;

    /// Write one entry. Fails with `EntryTooLarge` above [`Self::max_entry_len`].
    fn set(&self, key: &StorageKey, value: Bytes) -> Result<()>;

    /// Delete the entry at exactly `key`. Deleting an absent key succeeds.
    fn delete(&self, key: &StorageKey) -> Result<()>;

    /// Every entry whose key equals or segment-wise extends `prefix`,
    /// in ascending key order
    fn scan(&self, prefix: &StorageKey) -> Result<Vec<ScanEntry>>;

    /// Largest payload a single entry may hold
    fn max_entry_len(&self) -> usize;
}

impl<B: KvBackend + ?Sized> KvBackend for Arc<B> {
    fn get(&self, key: &StorageKey) -> Result<Option<Bytes>> {
        (**self).get(key)
    }

    fn set(&self, key: &StorageKey, value: Bytes) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &StorageKey) -> Result<()> {
        (**self).delete(key)
    }

    fn scan(&self, prefix: &StorageKey) -> Result<Vec<ScanEntry>> {
        (**self).scan(prefix)
    }

    fn max_entry_len(&self) -> usize {
        (**self).max_entry_len()
    }
}
