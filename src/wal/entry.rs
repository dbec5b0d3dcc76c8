//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries and their framing.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{ChunkKvError, Result};

/// Header size: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// Upper bound on a record body, guards against reading garbage lengths (64 MB)
pub const MAX_RECORD_SIZE: u32 = 64 * 1024 * 1024;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The operation to perform
    pub operation: Operation,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

/// Operations that can be logged
///
/// Keys are stored in their encoded byte form (see [`crate::key::codec`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Write one physical entry
    Set { key: Vec<u8>, value: Vec<u8> },

    /// Delete one physical entry
    Delete { key: Vec<u8> },
}

impl Operation {
    /// The encoded key this operation touches
    pub fn key(&self) -> &[u8] {
        match self {
            Operation::Set { key, .. } | Operation::Delete { key } => key,
        }
    }
}

/// Record body, everything covered by the CRC
#[derive(Serialize, Deserialize)]
struct Body {
    timestamp: u64,
    operation: Operation,
}

impl WalEntry {
    /// Create an entry stamped with the current time
    pub fn new(lsn: u64, operation: Operation) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            lsn,
            operation,
            timestamp,
        }
    }

    /// Serialize to a framed record: header followed by body
    pub fn encode(&self) -> Result<Vec<u8>> {
        let body = bincode::serialize(&Body {
            timestamp: self.timestamp,
            operation: self.operation.clone(),
        })?;

        if body.len() > MAX_RECORD_SIZE as usize {
            return Err(ChunkKvError::WalWrite(format!(
                "Record too large: {} bytes (max {})",
                body.len(),
                MAX_RECORD_SIZE
            )));
        }

        let mut record = Vec::with_capacity(HEADER_SIZE + body.len());
        record.extend_from_slice(&self.lsn.to_le_bytes());
        record.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());
        record.extend_from_slice(&(body.len() as u32).to_le_bytes());
        record.extend_from_slice(&body);
        Ok(record)
    }

    /// Rebuild an entry from its header fields and body, verifying the CRC
    pub fn decode(lsn: u64, crc: u32, body: &[u8]) -> Result<Self> {
        let actual = crc32fast::hash(body);
        if actual != crc {
            return Err(ChunkKvError::WalCorruption(format!(
                "CRC mismatch at LSN {}: expected {:08x}, got {:08x}",
                lsn, crc, actual
            )));
        }

        let body: Body = bincode::deserialize(body).map_err(|e| {
            ChunkKvError::WalCorruption(format!("Undecodable record at LSN {}: {}", lsn, e))
        })?;

        Ok(Self {
            lsn,
            operation: body.operation,
            timestamp: body.timestamp,
        })
    }
}

/// Parsed fixed-size record header
#[derive(Debug, Clone, Copy)]
pub(super) struct Header {
    pub lsn: u64,
    pub crc: u32,
    pub len: u32,
}

impl Header {
    pub(super) fn parse(bytes: &[u8; HEADER_SIZE]) -> Self {
        let mut lsn = [0u8; 8];
        let mut crc = [0u8; 4];
        let mut len = [0u8; 4];
        lsn.copy_from_slice(&bytes[0..8]);
        crc.copy_from_slice(&bytes[8..12]);
        len.copy_from_slice(&bytes[12..16]);

        Self {
            lsn: u64::from_le_bytes(lsn),
            crc: u32::from_le_bytes(crc),
            len: u32::from_le_bytes(len),
        }
    }
}
