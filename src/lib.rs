//! # chunkkv
//!
//! A hierarchical key-value adapter over stores with a bounded entry size:
//! - Keys are sequences of string segments with segment-wise ordering
//! - Values up to the entry limit are stored as one entry, unchanged
//! - Larger values are split into chunks keyed by lexically ordered suffixes
//! - Range scans and bulk deletes by key prefix
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Caller                                │
//! │          (load / save / remove / load_range / ...)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    ChunkedStore                              │
//! │       (chunking, reassembly, range scanner)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  get / set / delete / scan
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Memory    │          │     Log     │
//!   │  (BTreeMap) │          │ (WAL+index) │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use chunkkv::{ChunkedStore, Config, MemoryBackend, StorageAdapter, StorageKey};
//!
//! let backend = MemoryBackend::with_max_entry_len(4);
//! let store = ChunkedStore::new(backend, Config::builder().max_entry_len(4).build()).unwrap();
//!
//! let key = StorageKey::from(["doc", "snapshot"]);
//! store.save(&key, "hello world".into()).unwrap();
//!
//! assert_eq!(store.load(&key).unwrap().unwrap(), "hello world");
//! assert_eq!(store.backend().len(), 3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod key;
pub mod chunk;
pub mod wal;
pub mod backend;
pub mod adapter;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ChunkKvError, Result};
pub use config::Config;
pub use key::StorageKey;
pub use adapter::{Entry, StorageAdapter};
pub use backend::{KvBackend, LogBackend, MemoryBackend};
pub use store::ChunkedStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of chunkkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
