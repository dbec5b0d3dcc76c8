//! Chunked Value Store
//!
//! The adapter proper: maps logical values onto bounded physical entries.
//!
//! ## Responsibilities
//! - Store values up to `max_entry_len` as one entry at exactly the key
//! - Split larger values into chunks at `key + [suffix(i)]`
//! - Reassemble chunks on load using the backend's ascending scan
//! - Keep the two representations mutually exclusive
//!
//! ## Representation Invariant
//! Once an operation on `K` returns, at most one of these holds:
//! - one entry at exactly `K`, and none below it
//! - chunk entries below `K` whose concatenation is the value, and none at `K`
//!
//! There is no atomicity across the entries of one chunked value. A load
//! racing a save on the same key can observe a mix of old and new chunks,
//! and a save that fails partway leaves the chunks it already wrote in place.

mod dispatch;
mod range;

use bytes::{Bytes, BytesMut};

use crate::adapter::{Entry, StorageAdapter};
use crate::backend::KvBackend;
use crate::chunk::{chunk_key, split};
use crate::config::Config;
use crate::error::{ChunkKvError, Result};
use crate::key::StorageKey;

use self::dispatch::for_each_concurrent;

/// Chunking adapter over a [`KvBackend`]
///
/// Holds no state besides the backend handle and its configuration; every
/// method takes `&self` and may be called from many threads.
pub struct ChunkedStore<B> {
    backend: B,
    config: Config,
}

impl<B: KvBackend> ChunkedStore<B> {
    /// Wrap `backend` using `config`
    ///
    /// Fails if the config is invalid or its `max_entry_len` exceeds what the
    /// backend accepts.
    pub fn new(backend: B, config: Config) -> Result<Self> {
        config.validate()?;

        if config.max_entry_len > backend.max_entry_len() {
            return Err(ChunkKvError::Config(format!(
                "max_entry_len {} exceeds backend limit {}",
                config.max_entry_len,
                backend.max_entry_len()
            )));
        }

        Ok(Self { backend, config })
    }

    /// Wrap `backend` with default settings, chunking at the backend's limit
    pub fn with_backend(backend: B) -> Result<Self> {
        let config = Config::builder()
            .max_entry_len(backend.max_entry_len())
            .build();
        Self::new(backend, config)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the store, returning the backend
    pub fn into_backend(self) -> B {
        self.backend
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn save_single(&self, key: &StorageKey, data: Bytes) -> Result<()> {
        self.remove_descendants(key)?;
        self.backend.set(key, data)
    }

    fn save_chunked(&self, key: &StorageKey, data: Bytes) -> Result<()> {
        // Both the single entry and a longer previous chunk run must go,
        // or the tail of the old value would be read back after the new one.
        self.backend.delete(key)?;
        self.remove_descendants(key)?;

        let chunks: Vec<(StorageKey, Bytes)> = split(&data, self.config.max_entry_len)
            .enumerate()
            .map(|(index, chunk)| (chunk_key(key, index), data.slice_ref(chunk)))
            .collect();

        tracing::debug!(key = %key, chunks = chunks.len(), "writing chunked value");

        for_each_concurrent(&chunks, self.config.write_concurrency, |(physical_key, chunk)| {
            self.backend.set(physical_key, chunk.clone())
        })
    }

    /// Delete every entry strictly below `key`
    fn remove_descendants(&self, key: &StorageKey) -> Result<()> {
        let stale: Vec<StorageKey> = self
            .backend
            .scan(key)?
            .into_iter()
            .map(|(entry_key, _)| entry_key)
            .filter(|entry_key| entry_key.is_descendant_of(key))
            .collect();

        if !stale.is_empty() {
            tracing::debug!(key = %key, stale = stale.len(), "removing stale entries");
        }

        self.delete_all(&stale)
    }

    fn delete_all(&self, keys: &[StorageKey]) -> Result<()> {
        for_each_concurrent(keys, self.config.write_concurrency, |key| {
            self.backend.delete(key)
        })
    }
}

impl<B: KvBackend> StorageAdapter for ChunkedStore<B> {
    fn load(&self, key: &StorageKey) -> Result<Option<Bytes>> {
        ensure_logical(key)?;

        if let Some(value) = self.backend.get(key)? {
            return Ok(Some(value));
        }

        let mut chunks: Vec<Bytes> = self
            .backend
            .scan(key)?
            .into_iter()
            .filter(|(entry_key, _)| entry_key.is_descendant_of(key))
            .map(|(_, value)| value)
            .collect();

        match chunks.len() {
            0 => Ok(None),
            1 => Ok(chunks.pop()),
            count => {
                let total = chunks.iter().map(Bytes::len).sum();
                let mut buf = BytesMut::with_capacity(total);
                for chunk in &chunks {
                    buf.extend_from_slice(chunk);
                }
                tracing::debug!(key = %key, chunks = count, len = total, "reassembled value");
                Ok(Some(buf.freeze()))
            }
        }
    }

    fn save(&self, key: &StorageKey, data: Bytes) -> Result<()> {
        ensure_logical(key)?;

        if data.len() <= self.config.max_entry_len {
            self.save_single(key, data)
        } else {
            self.save_chunked(key, data)
        }
    }

    fn remove(&self, key: &StorageKey) -> Result<()> {
        ensure_logical(key)?;

        self.backend.delete(key)?;
        self.remove_descendants(key)
    }

    fn load_range(&self, prefix: &StorageKey) -> Result<Vec<Entry>> {
        self.scan_range(prefix)
    }

    fn remove_range(&self, prefix: &StorageKey) -> Result<()> {
        self.delete_range(prefix)
    }
}

/// Logical values need a key with at least one segment
fn ensure_logical(key: &StorageKey) -> Result<()> {
    if key.is_empty() {
        return Err(ChunkKvError::InvalidKey(
            "logical key must have at least one segment".to_string(),
        ));
    }
    Ok(())
}
