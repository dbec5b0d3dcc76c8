//! Error types for chunkkv
//!
//! Provides a unified error type for all operations. A missing key is never
//! an error: lookups return `Ok(None)` and scans return an empty `Vec`.

use thiserror::Error;

/// Result type alias using ChunkKvError
pub type Result<T> = std::result::Result<T, ChunkKvError>;

/// Unified error type for chunkkv operations
#[derive(Debug, Error)]
pub enum ChunkKvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("WAL write failed: {0}")]
    WalWrite(String),

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Entry too large: {len} bytes (max {max})")]
    EntryTooLarge { len: usize, max: usize },

    // -------------------------------------------------------------------------
    // Key Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for ChunkKvError {
    fn from(err: bincode::Error) -> Self {
        ChunkKvError::Serialization(err.to_string())
    }
}
