//! Single-flight lock for index runs.
//!
//! An index run mutates the chunk store, cache, and on-disk artifacts, so
//! only one run may be active at a time. Callers that lose the race get a
//! `RunInProgress` error instead of queueing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared running flag. Clones observe and contend on the same lock.
#[derive(Clone)]
pub struct RunLock {
    running: Arc<AtomicBool>,
}

impl RunLock {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attempt to start a run.
    ///
    /// Returns `Some(RunToken)` when no run is active; the token releases
    /// the lock when dropped. Returns `None` while another run holds it.
    pub fn try_acquire(&self) -> Option<RunToken> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Some(RunToken {
                flag: self.running.clone(),
            })
        } else {
            None
        }
    }

    /// Whether a run currently holds the lock.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for RunLock {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII token that releases the run lock when dropped.
///
/// Dropping on panic clears the flag too, so a failed run never wedges
/// the lock.
pub struct RunToken {
    flag: Arc<AtomicBool>,
}

impl Drop for RunToken {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_second_acquire_fails_while_held() {
        let lock = RunLock::new();

        let token = lock.try_acquire();
        assert!(token.is_some());
        assert!(lock.is_running());

        assert!(lock.try_acquire().is_none());

        drop(token);
        assert!(!lock.is_running());
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn test_token_releases_on_drop() {
        let lock = RunLock::new();
        {
            let _token = lock.try_acquire().unwrap();
            assert!(lock.is_running());
        }
        assert!(!lock.is_running());
    }

    #[test]
    fn test_clones_share_state() {
        let lock = RunLock::new();
        let clone = lock.clone();

        let _token = lock.try_acquire().unwrap();
        assert!(clone.is_running());
        assert!(clone.try_acquire().is_none());
    }

    #[test]
    fn test_thread_safety() {
        let lock = Arc::new(RunLock::new());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let lock = lock.clone();
                thread::spawn(move || {
                    if let Some(_token) = lock.try_acquire() {
                        thread::sleep(Duration::from_millis(10));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // Whatever interleaving happened, the lock must end up released.
        assert!(!lock.is_running());
    }
}
