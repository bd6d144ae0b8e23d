//! Time source for the engine.
//!
//! The engine reads "now" once per operation and passes it down; nothing
//! below this crate consults the wall clock.

use std::sync::atomic::{AtomicU64, Ordering};

use duet_core::UnixSeconds;

/// Trait for obtaining current time, enabling testability.
pub trait Clock: Send + Sync {
    /// Current time in seconds since Unix epoch.
    fn now_secs(&self) -> UnixSeconds;
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> UnixSeconds {
        // Pre-epoch system time reads as 0
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: UnixSeconds) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: UnixSeconds) {
        self.now.store(now, Ordering::Release);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> UnixSeconds {
        self.now.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_TIME: u64 = 1_700_000_000; // ~2023-11-14

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(BASE_TIME);
        assert_eq!(clock.now_secs(), BASE_TIME);
        clock.advance(61);
        assert_eq!(clock.now_secs(), BASE_TIME + 61);
        clock.set(5);
        assert_eq!(clock.now_secs(), 5);
    }

    #[test]
    fn test_system_clock_is_after_base() {
        assert!(SystemClock.now_secs() > BASE_TIME);
    }
}
