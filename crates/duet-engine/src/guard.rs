//! Single-flight guard for mutating operations.
//!
//! Other threads block until the running operation finishes. A second entry
//! from the thread that already holds the guard (a ledger or observer
//! callback calling back into the engine) is rejected with
//! `EngineError::Reentrant`. The guard is released on every exit path when
//! the permit drops.

use std::cell::Cell;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Default)]
pub struct OperationGuard {
    busy: ReentrantMutex<Cell<bool>>,
}

/// Proof that the caller holds the guard.
#[must_use]
pub struct OperationPermit<'a> {
    busy: ReentrantMutexGuard<'a, Cell<bool>>,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a mutating operation.
    pub fn enter(&self) -> EngineResult<OperationPermit<'_>> {
        let busy = self.busy.lock();
        if busy.get() {
            return Err(EngineError::Reentrant);
        }
        busy.set(true);
        Ok(OperationPermit { busy })
    }

    /// Whether an operation is running on the current thread.
    pub fn is_held_by_current_thread(&self) -> bool {
        // try_lock succeeds for the owning thread and for an idle guard
        self.busy.try_lock().map(|busy| busy.get()).unwrap_or(false)
    }
}

impl Drop for OperationPermit<'_> {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_nested_entry_is_rejected() {
        let guard = OperationGuard::new();
        let permit = guard.enter().unwrap();
        assert!(guard.is_held_by_current_thread());
        assert!(matches!(guard.enter(), Err(EngineError::Reentrant)));
        drop(permit);
        assert!(!guard.is_held_by_current_thread());
        assert!(guard.enter().is_ok());
    }

    #[test]
    fn test_released_on_error_path() {
        fn failing(guard: &OperationGuard) -> EngineResult<()> {
            let _permit = guard.enter()?;
            Err(EngineError::FeedUnavailable)
        }
        let guard = OperationGuard::new();
        assert!(failing(&guard).is_err());
        assert!(guard.enter().is_ok());
    }

    #[test]
    fn test_other_threads_wait_instead_of_failing() {
        let guard = Arc::new(OperationGuard::new());
        let completed = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let completed = Arc::clone(&completed);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let _permit = guard.enter().unwrap();
                        completed.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(completed.load(Ordering::Relaxed), 800);
    }
}
