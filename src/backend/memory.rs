//! In-memory backend
//!
//! BTreeMap-based store with a parking_lot RwLock.

use std::collections::BTreeMap;

use bytes::Bytes;
use parking_lot::RwLock;

use super::{KvBackend, ScanEntry};
use crate::config::DEFAULT_MAX_ENTRY_LEN;
use crate::error::{ChunkKvError, Result};
use crate::key::StorageKey;

/// Ordered in-memory key-value store
///
/// Keys are ordered segment-wise (see [`StorageKey`]), so every key that
/// extends a prefix sits in one contiguous run starting at the prefix itself.
pub struct MemoryBackend {
    data: RwLock<BTreeMap<StorageKey, Bytes>>,
    max_entry_len: usize,
}

impl MemoryBackend {
    /// Create an empty store with the default 64 KiB entry limit
    pub fn new() -> Self {
        Self::with_max_entry_len(DEFAULT_MAX_ENTRY_LEN)
    }

    /// Create an empty store with a custom entry limit
    pub fn with_max_entry_len(max_entry_len: usize) -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            max_entry_len,
        }
    }

    /// Number of physical entries
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.data.write().clear();
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &StorageKey) -> Result<Option<Bytes>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set(&self, key: &StorageKey, value: Bytes) -> Result<()> {
        if value.len() > self.max_entry_len {
            return Err(ChunkKvError::EntryTooLarge {
                len: value.len(),
                max: self.max_entry_len,
            });
        }
        self.data.write().insert(key.clone(), value);
        Ok(())
    }

    fn delete(&self, key: &StorageKey) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn scan(&self, prefix: &StorageKey) -> Result<Vec<ScanEntry>> {
        let data = self.data.read();
        let entries = data
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(entries)
    }

    fn max_entry_len(&self) -> usize {
        self.max_entry_len
    }
}
