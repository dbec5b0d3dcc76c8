//! WAL Writer
//!
//! Handles appending entries to the WAL file.
//!
//! A failed append never leaves a torn record behind later ones: the file is
//! cut back to the end of the last complete record before the error is
//! returned. If that cut fails too, the writer is poisoned and refuses every
//! further append until the log is reopened.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use super::{Operation, WalEntry};
use crate::config::WalSyncStrategy;
use crate::error::{ChunkKvError, Result};

/// Writes entries to the WAL file
pub struct WalWriter {
    writer: BufWriter<File>,
    /// LSN the next appended entry receives
    next_lsn: u64,
    sync_strategy: WalSyncStrategy,
    /// Entries appended since the last fsync
    unsynced: usize,
    /// File length up to the end of the last complete record
    committed_len: u64,
    /// Set when a failed append could not be rolled back
    poisoned: bool,
}

impl WalWriter {
    /// Create an empty WAL file, replacing any existing one. LSNs start at 1.
    pub fn create(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::with_file(file, 0, 1, sync_strategy))
    }

    /// Open an existing WAL for appending
    ///
    /// `next_lsn` must be one past the last LSN in the file, as reported by
    /// recovery.
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy, next_lsn: u64) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        let len = file.seek(SeekFrom::End(0))?;
        Ok(Self::with_file(file, len, next_lsn.max(1), sync_strategy))
    }

    fn with_file(
        file: File,
        committed_len: u64,
        next_lsn: u64,
        sync_strategy: WalSyncStrategy,
    ) -> Self {
        Self {
            writer: BufWriter::new(file),
            next_lsn,
            sync_strategy,
            unsynced: 0,
            committed_len,
            poisoned: false,
        }
    }

    /// Append an operation to the WAL, returning its LSN
    ///
    /// The record is flushed to the OS before returning; fsync follows the
    /// configured [`WalSyncStrategy`].
    pub fn append(&mut self, operation: Operation) -> Result<u64> {
        let lsn = self.next_lsn;
        self.ensure_usable()?;

        let record = WalEntry::new(lsn, operation).encode()?;

        let written = self
            .writer
            .write_all(&record)
            .and_then(|_| self.writer.flush());
        if let Err(e) = written {
            if let Err(rollback) = self.rollback() {
                self.poisoned = true;
                tracing::error!(lsn, error = %rollback, "could not cut torn record from WAL");
            }
            return Err(ChunkKvError::WalWrite(format!("append LSN {}: {}", lsn, e)));
        }

        self.committed_len += record.len() as u64;
        self.next_lsn += 1;
        self.unsynced += 1;

        let due = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.unsynced >= count,
        };
        if due {
            self.sync()?;
        }

        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.ensure_usable()?;
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Change how often appends are fsynced
    pub fn set_sync_strategy(&mut self, sync_strategy: WalSyncStrategy) {
        self.sync_strategy = sync_strategy;
    }

    /// LSN the next appended entry will receive
    pub fn current_lsn(&self) -> u64 {
        self.next_lsn
    }

    /// Entries appended since the last fsync
    pub fn unsynced_entries(&self) -> usize {
        self.unsynced
    }

    /// Whether an earlier failure left the file in an unknown state
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.poisoned {
            return Err(ChunkKvError::WalWrite(format!(
                "WAL unusable after a failed rollback at LSN {}, reopen the store",
                self.next_lsn
            )));
        }
        Ok(())
    }

    /// Cut the file back to `committed_len`, dropping anything still buffered
    fn rollback(&mut self) -> io::Result<()> {
        let file = self.writer.get_ref().try_clone()?;
        let stale = std::mem::replace(&mut self.writer, BufWriter::new(file));
        // into_parts hands back the unwritten buffer instead of flushing it
        let (_, _unwritten) = stale.into_parts();

        let file = self.writer.get_mut();
        file.set_len(self.committed_len)?;
        file.seek(SeekFrom::Start(self.committed_len))?;
        Ok(())
    }
}
