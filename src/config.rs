//! Configuration for chunkkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{ChunkKvError, Result};

/// Default per-entry limit of the backing store (64 KiB)
pub const DEFAULT_MAX_ENTRY_LEN: usize = 64 * 1024;

/// Default number of physical writes a single operation keeps in flight
pub const DEFAULT_WRITE_CONCURRENCY: usize = 8;

/// Main configuration for a chunkkv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Chunking Configuration
    // -------------------------------------------------------------------------
    /// Largest payload a single physical entry may hold.
    /// Values above this are split into chunks.
    pub max_entry_len: usize,

    /// Max physical writes/deletes dispatched in parallel by one operation
    pub write_concurrency: usize,

    // -------------------------------------------------------------------------
    // Log Backend Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the log backend
    /// Internal structure:
    ///   {data_dir}/
    ///     └── wal.log          (write-ahead log)
    pub data_dir: PathBuf,

    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entry_len: DEFAULT_MAX_ENTRY_LEN,
            write_concurrency: DEFAULT_WRITE_CONCURRENCY,
            data_dir: PathBuf::from("./chunkkv_data"),
            wal_sync_strategy: WalSyncStrategy::EveryNEntries { count: 100 },
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.max_entry_len == 0 {
            return Err(ChunkKvError::Config(
                "max_entry_len must be greater than zero".to_string(),
            ));
        }

        if self.write_concurrency == 0 {
            return Err(ChunkKvError::Config(
                "write_concurrency must be greater than zero".to_string(),
            ));
        }

        if let WalSyncStrategy::EveryNEntries { count: 0 } = self.wal_sync_strategy {
            return Err(ChunkKvError::Config(
                "EveryNEntries sync count must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the per-entry size limit (in bytes)
    pub fn max_entry_len(mut self, len: usize) -> Self {
        self.config.max_entry_len = len;
        self
    }

    /// Set how many physical writes may run in parallel
    pub fn write_concurrency(mut self, count: usize) -> Self {
        self.config.write_concurrency = count;
        self
    }

    /// Set the data directory (log backend only)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
