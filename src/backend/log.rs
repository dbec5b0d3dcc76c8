//! Log backend
//!
//! Durable store: every mutation is appended to the WAL, then applied to an
//! ordered in-memory index keyed by the encoded form of each key.
//!
//! ## Concurrency Model
//! - Writes serialize on the WAL mutex and update the index while holding it,
//!   so index order always matches log order
//! - Reads only take the index read lock

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};

use super::{KvBackend, ScanEntry};
use crate::config::{Config, WalSyncStrategy};
use crate::error::{ChunkKvError, Result};
use crate::key::{codec, StorageKey};
use crate::wal::{Operation, RecoveryResult, WalRecovery, WalWriter, MAX_RECORD_SIZE};

/// WAL-backed ordered key-value store
pub struct LogBackend {
    data_dir: PathBuf,
    sync_strategy: WalSyncStrategy,
    max_entry_len: usize,
    wal: Mutex<WalWriter>,
    index: RwLock<BTreeMap<Bytes, Bytes>>,
    recovery: RecoveryResult,
}

impl LogBackend {
    const WAL_FILENAME: &'static str = "wal.log";
    const COMPACT_FILENAME: &'static str = "wal.log.compact";

    /// Open or create a store in `config.data_dir`
    ///
    /// On startup:
    /// 1. Create the data directory if needed
    /// 2. Replay the WAL into the index, truncating a torn tail
    /// 3. Reopen the WAL for appending
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        if config.max_entry_len > MAX_RECORD_SIZE as usize {
            return Err(ChunkKvError::Config(format!(
                "max_entry_len {} exceeds the WAL record limit {}",
                config.max_entry_len, MAX_RECORD_SIZE
            )));
        }
        fs::create_dir_all(&config.data_dir)?;

        let wal_path = config.data_dir.join(Self::WAL_FILENAME);
        let mut index = BTreeMap::new();

        let (wal, recovery) = if wal_path.exists() {
            let (entries, recovery) = WalRecovery::recover(&wal_path)?;
            for entry in entries {
                match entry.operation {
                    Operation::Set { key, value } => {
                        index.insert(Bytes::from(key), Bytes::from(value));
                    }
                    Operation::Delete { key } => {
                        index.remove(key.as_slice());
                    }
                }
            }
            let wal = WalWriter::open(&wal_path, config.wal_sync_strategy, recovery.last_lsn + 1)?;
            (wal, recovery)
        } else {
            let wal = WalWriter::create(&wal_path, config.wal_sync_strategy)?;
            (wal, RecoveryResult::default())
        };

        tracing::info!(
            data_dir = %config.data_dir.display(),
            entries = index.len(),
            recovered = recovery.entries_recovered,
            truncated = recovery.was_truncated,
            "log backend opened"
        );

        Ok(Self {
            data_dir: config.data_dir.clone(),
            sync_strategy: config.wal_sync_strategy,
            max_entry_len: config.max_entry_len,
            wal: Mutex::new(wal),
            index: RwLock::new(index),
            recovery,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(&config)
    }

    /// Rewrite the WAL so it holds exactly one `Set` per live entry
    ///
    /// The compacted log is written beside the current one and synced. It is
    /// then renamed over the active log and becomes the writer, so nothing
    /// after the rename can leave appends going to the replaced file.
    pub fn compact(&self) -> Result<()> {
        let mut wal = self.wal.lock();
        let index = self.index.read();

        let wal_path = self.data_dir.join(Self::WAL_FILENAME);
        let compact_path = self.data_dir.join(Self::COMPACT_FILENAME);

        let mut compacted = WalWriter::create(&compact_path, WalSyncStrategy::EveryNEntries {
            count: usize::MAX,
        })?;
        for (key, value) in index.iter() {
            compacted.append(Operation::Set {
                key: key.to_vec(),
                value: value.to_vec(),
            })?;
        }
        compacted.sync()?;
        compacted.set_sync_strategy(self.sync_strategy);

        fs::rename(&compact_path, &wal_path)?;
        *wal = compacted;

        // Make the rename itself durable
        File::open(&self.data_dir)?.sync_all()?;

        tracing::info!(entries = index.len(), "WAL compacted");
        Ok(())
    }

    /// Force the WAL to disk
    pub fn sync(&self) -> Result<()> {
        self.wal.lock().sync()
    }

    /// Close the store gracefully, syncing the WAL
    pub fn close(self) -> Result<()> {
        self.sync()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of live physical entries
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the active WAL file
    pub fn wal_path(&self) -> PathBuf {
        self.data_dir.join(Self::WAL_FILENAME)
    }

    /// What replay found when the store was opened
    pub fn recovery(&self) -> &RecoveryResult {
        &self.recovery
    }
}

impl KvBackend for LogBackend {
    fn get(&self, key: &StorageKey) -> Result<Option<Bytes>> {
        let encoded = codec::encode(key);
        Ok(self.index.read().get(&encoded).cloned())
    }

    fn set(&self, key: &StorageKey, value: Bytes) -> Result<()> {
        if value.len() > self.max_entry_len {
            return Err(ChunkKvError::EntryTooLarge {
                len: value.len(),
                max: self.max_entry_len,
            });
        }

        let encoded = codec::encode(key);
        let mut wal = self.wal.lock();
        wal.append(Operation::Set {
            key: encoded.to_vec(),
            value: value.to_vec(),
        })?;
        self.index.write().insert(encoded, value);
        Ok(())
    }

    fn delete(&self, key: &StorageKey) -> Result<()> {
        let encoded = codec::encode(key);
        let mut wal = self.wal.lock();
        if !self.index.read().contains_key(&encoded) {
            return Ok(());
        }

        wal.append(Operation::Delete {
            key: encoded.to_vec(),
        })?;
        self.index.write().remove(&encoded);
        Ok(())
    }

    fn scan(&self, prefix: &StorageKey) -> Result<Vec<ScanEntry>> {
        let encoded = codec::encode(prefix);
        let index = self.index.read();
        index
            .range(encoded.clone()..)
            .take_while(|(key, _)| key.starts_with(&encoded))
            .map(|(key, value)| -> Result<ScanEntry> { Ok((codec::decode(key)?, value.clone())) })
            .collect()
    }

    fn max_entry_len(&self) -> usize {
        self.max_entry_len
    }
}
