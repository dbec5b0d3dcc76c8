//! Range Scanner
//!
//! Prefix scans and bulk deletes over physical entries.
//!
//! Matching is segment-wise: `[A, B]` is in the range of `[A]`, `[AB]` is not.
//! Results are physical entries, so a chunked value inside the range shows up
//! as one entry per chunk.

use crate::adapter::Entry;
use crate::backend::KvBackend;
use crate::error::Result;
use crate::key::StorageKey;

use super::dispatch::for_each_concurrent;
use super::ChunkedStore;

impl<B: KvBackend> ChunkedStore<B> {
    pub(super) fn scan_range(&self, prefix: &StorageKey) -> Result<Vec<Entry>> {
        let entries: Vec<Entry> = self
            .backend
            .scan(prefix)?
            .into_iter()
            .map(|(key, data)| Entry { key, data })
            .collect();

        tracing::debug!(prefix = %prefix, entries = entries.len(), "loaded range");
        Ok(entries)
    }

    pub(super) fn delete_range(&self, prefix: &StorageKey) -> Result<()> {
        let keys: Vec<StorageKey> = self
            .backend
            .scan(prefix)?
            .into_iter()
            .map(|(key, _)| key)
            .collect();

        tracing::debug!(prefix = %prefix, entries = keys.len(), "removing range");

        for_each_concurrent(&keys, self.config.write_concurrency, |key| {
            self.backend.delete(key)
        })
    }
}
