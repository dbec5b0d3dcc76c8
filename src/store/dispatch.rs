//! Bounded parallel dispatch of backend operations
//!
//! Runs one operation per item on a scoped worker group and joins every
//! worker before returning, so no write outlives the call that issued it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::{ChunkKvError, Result};

/// Apply `op` to every item, at most `concurrency` at a time
///
/// Workers stop picking up new items once any operation fails. Items already
/// in flight run to completion, then the first failure is returned.
pub(crate) fn for_each_concurrent<T, F>(items: &[T], concurrency: usize, op: F) -> Result<()>
where
    T: Sync,
    F: Fn(&T) -> Result<()> + Sync,
{
    let workers = concurrency.min(items.len());
    if workers <= 1 {
        return items.iter().try_for_each(&op);
    }

    let next = AtomicUsize::new(0);
    let failed = AtomicBool::new(false);
    let first_error: Mutex<Option<ChunkKvError>> = Mutex::new(None);

    let joined = crossbeam::thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|_| loop {
                if failed.load(Ordering::Acquire) {
                    break;
                }
                let Some(item) = items.get(next.fetch_add(1, Ordering::Relaxed)) else {
                    break;
                };
                if let Err(e) = op(item) {
                    failed.store(true, Ordering::Release);
                    let mut slot = first_error.lock();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                }
            });
        }
    });

    if joined.is_err() {
        return Err(ChunkKvError::Backend(
            "backend worker panicked".to_string(),
        ));
    }

    match first_error.into_inner() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
