//! WAL Recovery
//!
//! Handles crash recovery by replaying the WAL.

use std::fs::OpenOptions;
use std::path::Path;

use super::{WalEntry, WalReader};
use crate::error::{ChunkKvError, Result};

/// Handles WAL recovery after crash
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Number of corrupted entries skipped (everything after the first bad
    /// record counts as one)
    pub entries_corrupted: u64,

    /// Last valid LSN
    pub last_lsn: u64,

    /// Length of the valid part of the file
    pub valid_len: u64,

    /// Whether the WAL was truncated (partial writes removed)
    pub was_truncated: bool,
}

impl WalRecovery {
    /// Recover entries from a WAL file
    ///
    /// This will:
    /// 1. Read all valid entries
    /// 2. Stop at the first torn or corrupted record
    /// 3. Truncate the file there, dropping the partial write
    /// 4. Return all valid entries in order
    pub fn recover(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let (entries, mut result) = Self::scan(path)?;

        if result.entries_corrupted > 0 {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(result.valid_len)?;
            file.sync_all()?;
            result.was_truncated = true;

            tracing::warn!(
                path = %path.display(),
                valid_len = result.valid_len,
                last_lsn = result.last_lsn,
                "truncated corrupted WAL tail"
            );
        }

        Ok((entries, result))
    }

    /// Verify integrity of a WAL file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::scan(path).map(|(_, result)| result)
    }

    fn scan(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let mut reader = WalReader::open(path)?;
        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();

        loop {
            match reader.next_entry() {
                Ok(Some(entry)) => {
                    result.entries_recovered += 1;
                    entries.push(entry);
                }
                Ok(None) => break,
                Err(ChunkKvError::WalCorruption(reason)) => {
                    tracing::debug!(%reason, offset = reader.position(), "WAL replay stopped");
                    result.entries_corrupted = 1;
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        result.last_lsn = reader.last_lsn();
        result.valid_len = reader.position();
        Ok((entries, result))
    }
}
