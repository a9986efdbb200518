/*!
 * Counting Semaphore
 *
 * Classic counting semaphore on top of parking_lot's mutex and condvar.
 * The permit count is only mutated while the mutex is held, and blocked
 * acquirers park on the condvar instead of spinning.
 */

use parking_lot::{Condvar, Mutex};

/// Counting semaphore
///
/// `acquire` blocks until a permit is available and takes it; `release`
/// returns one permit and wakes at most one blocked acquirer. The count
/// never goes negative.
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    /// Create a semaphore holding `permits` permits
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Take one permit, blocking while none are available
    pub fn acquire(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }
        *permits -= 1;
    }

    /// Take one permit if one is available right now
    pub fn try_acquire(&self) -> bool {
        let mut permits = self.permits.lock();
        if *permits == 0 {
            return false;
        }
        *permits -= 1;
        true
    }

    /// Return one permit and wake a single waiter
    pub fn release(&self) {
        let mut permits = self.permits.lock();
        *permits += 1;
        self.available.notify_one();
    }

    /// Snapshot of the free permits (diagnostics only, stale on return)
    pub fn available_permits(&self) -> usize {
        *self.permits.lock()
    }
}

impl std::fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Semaphore")
            .field("available_permits", &self.available_permits())
            .finish()
    }
}
