//! Per-task mutual exclusion.
//!
//! Calls for one id run one at a time; calls for different ids never wait
//! on each other beyond the brief registry lookup.

use crate::model::task::TaskId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
pub(crate) struct TaskLocks {
    slots: Mutex<HashMap<TaskId, Arc<Mutex<()>>>>,
}

impl TaskLocks {
    /// Runs `f` while holding the lock for `id`.
    pub(crate) fn with_lock<T>(&self, id: TaskId, f: impl FnOnce() -> T) -> T {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(id).or_default())
        };
        let _release = SlotRelease {
            locks: self,
            id,
            slot: &slot,
        };

        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Drops the registry entry for `id` once no other caller holds it,
/// including when the critical section unwinds.
struct SlotRelease<'a> {
    locks: &'a TaskLocks,
    id: TaskId,
    slot: &'a Arc<Mutex<()>>,
}

impl Drop for SlotRelease<'_> {
    fn drop(&mut self) {
        let mut slots = self
            .locks
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Registry + this caller's clone only.
        if Arc::strong_count(self.slot) == 2 {
            slots.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TaskLocks;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use uuid::Uuid;

    #[test]
    fn same_id_sections_never_overlap() {
        let locks = Arc::new(TaskLocks::default());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let id = Uuid::new_v4();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    for _ in 0..50 {
                        locks.with_lock(id, || {
                            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                            max_seen.fetch_max(now, Ordering::SeqCst);
                            thread::yield_now();
                            inside.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.tracked(), 0);
    }

    #[test]
    fn panicking_section_releases_its_slot() {
        let locks = TaskLocks::default();
        let id = Uuid::new_v4();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            locks.with_lock(id, || panic!("rating failed mid-write"))
        }));
        assert!(outcome.is_err());
        assert_eq!(locks.tracked(), 0);

        assert_eq!(locks.with_lock(id, || 7), 7);
        assert_eq!(locks.tracked(), 0);
    }

    #[test]
    fn different_ids_can_be_held_together() {
        let locks = TaskLocks::default();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let nested = locks.with_lock(first, || locks.with_lock(second, || 42));
        assert_eq!(nested, 42);
        assert_eq!(locks.tracked(), 0);
    }
}
