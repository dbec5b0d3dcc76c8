//! Tests for ChunkedStore
//!
//! These tests verify:
//! - Single-entry save/load round trips
//! - Chunked save/load round trips
//! - Representation exclusivity on overwrite
//! - Remove semantics and idempotence
//! - Key validation and construction checks
//! - Concurrent use from several threads

use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use chunkkv::config::DEFAULT_MAX_ENTRY_LEN;
use chunkkv::{
    ChunkKvError, ChunkedStore, Config, Entry, KvBackend, MemoryBackend, StorageAdapter,
    StorageKey,
};

// =============================================================================
// Helper Functions
// =============================================================================

const MAX: usize = 16;

fn setup_store() -> ChunkedStore<MemoryBackend> {
    setup_store_with_concurrency(4)
}

fn setup_store_with_concurrency(concurrency: usize) -> ChunkedStore<MemoryBackend> {
    let backend = MemoryBackend::with_max_entry_len(MAX);
    let config = Config::builder()
        .max_entry_len(MAX)
        .write_concurrency(concurrency)
        .build();
    ChunkedStore::new(backend, config).unwrap()
}

fn payload(len: usize, seed: u8) -> Bytes {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect::<Vec<u8>>()
        .into()
}

fn key() -> StorageKey {
    StorageKey::from(["AAAAA", "sync-state", "xxxxx"])
}

// =============================================================================
// Single Entry Tests
// =============================================================================

#[test]
fn test_load_missing_key() {
    let store = setup_store();

    assert_eq!(store.load(&key()).unwrap(), None);
}

#[test]
fn test_save_load_small() {
    let store = setup_store();
    let data = payload(6, 1);

    store.save(&key(), data.clone()).unwrap();

    assert_eq!(store.load(&key()).unwrap(), Some(data));
    assert_eq!(store.backend().len(), 1);
}

#[test]
fn test_single_segment_key() {
    let store = setup_store();
    let key = StorageKey::from(["storage-adapter-id"]);

    store.save(&key, payload(3, 9)).unwrap();

    assert_eq!(store.load(&key).unwrap(), Some(payload(3, 9)));
}

#[test]
fn test_empty_payload_is_not_absent() {
    let store = setup_store();

    store.save(&key(), Bytes::new()).unwrap();

    assert_eq!(store.load(&key()).unwrap(), Some(Bytes::new()));
    assert_eq!(
        store.load_range(&key()).unwrap(),
        vec![Entry::new(key(), Bytes::new())]
    );
}

#[test]
fn test_payload_at_limit_is_single_entry() {
    let store = setup_store();
    let data = payload(MAX, 2);

    store.save(&key(), data.clone()).unwrap();

    assert_eq!(store.backend().get(&key()).unwrap(), Some(data));
    assert_eq!(store.backend().len(), 1);
}

// =============================================================================
// Chunked Value Tests
// =============================================================================

#[test]
fn test_payload_over_limit_is_chunked() {
    let store = setup_store();
    let data = payload(MAX + 1, 3);

    store.save(&key(), data.clone()).unwrap();

    let backend = store.backend();
    assert_eq!(backend.get(&key()).unwrap(), None);
    assert_eq!(backend.get(&key().child("a")).unwrap(), Some(data.slice(..MAX)));
    assert_eq!(backend.get(&key().child("b")).unwrap(), Some(data.slice(MAX..)));
    assert_eq!(store.load(&key()).unwrap(), Some(data));
}

#[test]
fn test_exact_multiple_has_no_empty_chunk() {
    let store = setup_store();
    let data = payload(3 * MAX, 4);

    store.save(&key(), data.clone()).unwrap();

    let entries = store.load_range(&key()).unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.data.len() == MAX));
    assert_eq!(store.load(&key()).unwrap(), Some(data));
}

#[test]
fn test_roundtrip_default_limit_three_chunks_plus_one() {
    let backend = MemoryBackend::new();
    let store = ChunkedStore::with_backend(backend).unwrap();
    let data = payload(3 * DEFAULT_MAX_ENTRY_LEN + 1, 5);

    store.save(&key(), data.clone()).unwrap();

    assert_eq!(store.backend().len(), 4);
    assert_eq!(store.load(&key()).unwrap(), Some(data));
}

#[test]
fn test_roundtrip_past_first_suffix_run() {
    let store = setup_store();
    // 40 chunks: suffixes a..z then za..zn
    let data = payload(40 * MAX - 3, 6);

    store.save(&key(), data.clone()).unwrap();

    assert_eq!(store.backend().len(), 40);
    assert!(store.backend().get(&key().child("zn")).unwrap().is_some());
    assert_eq!(store.load(&key()).unwrap(), Some(data));
}

#[test]
fn test_sequential_writes_roundtrip() {
    let store = setup_store_with_concurrency(1);
    let data = payload(10 * MAX + 7, 7);

    store.save(&key(), data.clone()).unwrap();

    assert_eq!(store.load(&key()).unwrap(), Some(data));
}

// =============================================================================
// Overwrite Tests
// =============================================================================

#[test]
fn test_overwrite_small_with_small() {
    let store = setup_store();

    store.save(&key(), payload(4, 1)).unwrap();
    store.save(&key(), payload(5, 2)).unwrap();

    assert_eq!(
        store.load_range(&key()).unwrap(),
        vec![Entry::new(key(), payload(5, 2))]
    );
}

#[test]
fn test_overwrite_large_with_small_leaves_one_entry() {
    let store = setup_store();

    store.save(&key(), payload(5 * MAX, 1)).unwrap();
    store.save(&key(), payload(4, 2)).unwrap();

    assert_eq!(
        store.load_range(&key()).unwrap(),
        vec![Entry::new(key(), payload(4, 2))]
    );
    assert_eq!(store.load(&key()).unwrap(), Some(payload(4, 2)));
}

#[test]
fn test_overwrite_small_with_large_clears_exact_key() {
    let store = setup_store();
    let large = payload(3 * MAX + 2, 3);

    store.save(&key(), payload(4, 2)).unwrap();
    store.save(&key(), large.clone()).unwrap();

    assert_eq!(store.backend().get(&key()).unwrap(), None);
    assert_eq!(store.load(&key()).unwrap(), Some(large));
}

#[test]
fn test_overwrite_large_with_shorter_large_drops_old_tail() {
    let store = setup_store();
    let shorter = payload(2 * MAX + 1, 4);

    store.save(&key(), payload(6 * MAX, 3)).unwrap();
    store.save(&key(), shorter.clone()).unwrap();

    assert_eq!(store.load_range(&key()).unwrap().len(), 3);
    assert_eq!(store.load(&key()).unwrap(), Some(shorter));
}

// =============================================================================
// Remove Tests
// =============================================================================

#[test]
fn test_remove_small_value() {
    let store = setup_store();

    store.save(&key(), payload(4, 1)).unwrap();
    store.remove(&key()).unwrap();

    assert_eq!(store.load(&key()).unwrap(), None);
    assert!(store.load_range(&key()).unwrap().is_empty());
}

#[test]
fn test_remove_chunked_value() {
    let store = setup_store();

    store.save(&key(), payload(4 * MAX + 1, 1)).unwrap();
    store.remove(&key()).unwrap();

    assert_eq!(store.load(&key()).unwrap(), None);
    assert!(store.backend().is_empty());
}

#[test]
fn test_remove_absent_key_is_noop() {
    let store = setup_store();

    store.remove(&key()).unwrap();
    store.remove(&key()).unwrap();

    assert!(store.backend().is_empty());
}

#[test]
fn test_remove_twice_same_state() {
    let store = setup_store();
    let other = StorageKey::from(["BBBBB"]);
    store.save(&key(), payload(4, 1)).unwrap();
    store.save(&other, payload(4, 2)).unwrap();

    store.remove(&key()).unwrap();
    let after_first = store.load_range(&StorageKey::root()).unwrap();
    store.remove(&key()).unwrap();
    let after_second = store.load_range(&StorageKey::root()).unwrap();

    assert_eq!(after_first, after_second);
    assert_eq!(after_second, vec![Entry::new(other, payload(4, 2))]);
}

#[test]
fn test_remove_keeps_segment_neighbours() {
    let store = setup_store();
    let neighbour = StorageKey::from(["AAAAAB"]);
    store.save(&StorageKey::from(["AAAAA"]), payload(4, 1)).unwrap();
    store.save(&neighbour, payload(4, 2)).unwrap();

    store.remove(&StorageKey::from(["AAAAA"])).unwrap();

    assert_eq!(store.load(&neighbour).unwrap(), Some(payload(4, 2)));
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_empty_key_rejected() {
    let store = setup_store();
    let root = StorageKey::root();

    assert!(matches!(store.load(&root), Err(ChunkKvError::InvalidKey(_))));
    assert!(matches!(
        store.save(&root, payload(1, 0)),
        Err(ChunkKvError::InvalidKey(_))
    ));
    assert!(matches!(store.remove(&root), Err(ChunkKvError::InvalidKey(_))));
}

#[test]
fn test_limit_above_backend_rejected() {
    let backend = MemoryBackend::with_max_entry_len(8);
    let config = Config::builder().max_entry_len(16).build();

    let result = ChunkedStore::new(backend, config);

    assert!(matches!(result, Err(ChunkKvError::Config(_))));
}

#[test]
fn test_invalid_config_rejected() {
    let zero_len = Config::builder().max_entry_len(0).build();
    let zero_workers = Config::builder().write_concurrency(0).build();

    assert!(matches!(
        ChunkedStore::new(MemoryBackend::new(), zero_len),
        Err(ChunkKvError::Config(_))
    ));
    assert!(matches!(
        ChunkedStore::new(MemoryBackend::new(), zero_workers),
        Err(ChunkKvError::Config(_))
    ));
}

#[test]
fn test_with_backend_uses_backend_limit() {
    let store = ChunkedStore::with_backend(MemoryBackend::with_max_entry_len(100)).unwrap();

    assert_eq!(store.config().max_entry_len, 100);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_saves_on_distinct_keys() {
    let store = Arc::new(setup_store());

    thread::scope(|scope| {
        for t in 0..8u8 {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                let key = StorageKey::from(["doc".to_string(), format!("{}", t)].to_vec());
                store.save(&key, payload(7 * MAX + t as usize, t)).unwrap();
            });
        }
    });

    for t in 0..8u8 {
        let key = StorageKey::from(["doc".to_string(), format!("{}", t)].to_vec());
        assert_eq!(
            store.load(&key).unwrap(),
            Some(payload(7 * MAX + t as usize, t))
        );
    }
}

#[test]
fn test_store_over_shared_backend() {
    let backend = Arc::new(MemoryBackend::with_max_entry_len(MAX));
    let store = ChunkedStore::with_backend(Arc::clone(&backend)).unwrap();

    store.save(&key(), payload(2 * MAX, 1)).unwrap();

    assert_eq!(backend.len(), 2);
}
