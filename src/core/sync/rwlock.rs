/*!
 * Bounded Reader/Writer Lock
 *
 * A reader/writer lock assembled from two counting semaphores:
 * - writer semaphore with a single permit (writers are serialized)
 * - reader semaphore with `max_readers` permits (readers are bounded)
 *
 * Unlike `std::sync::RwLock`, the number of concurrent readers is capped:
 * the (N+1)-th reader blocks even when no writer is active.
 *
 * A writer takes the writer permit and then drains every reader permit, so
 * the protected data is never aliased mutably. Readers and writers have no
 * priority policy beyond what the two semaphores give; a steady stream of
 * readers can delay a writer indefinitely.
 */

use super::semaphore::Semaphore;
use crate::core::limits::{DEFAULT_MAX_READERS, WRITER_PERMITS};
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

/// Reader/writer lock with a fixed reader bound
pub struct ReaderWriterLock<T> {
    writer: Semaphore,
    readers: Semaphore,
    max_readers: usize,
    value: UnsafeCell<T>,
}

// SAFETY: shared access only happens through ReadGuard (many readers, no writer)
// and exclusive access only through WriteGuard (one writer holding every reader permit).
unsafe impl<T: Send + Sync> Sync for ReaderWriterLock<T> {}

impl<T> ReaderWriterLock<T> {
    /// Create a lock with the default reader bound
    pub fn new(value: T) -> Self {
        Self::with_max_readers(value, DEFAULT_MAX_READERS)
    }

    /// Create a lock allowing at most `max_readers` concurrent readers
    ///
    /// A bound of zero is raised to one.
    pub fn with_max_readers(value: T, max_readers: usize) -> Self {
        let max_readers = max_readers.max(1);
        Self {
            writer: Semaphore::new(WRITER_PERMITS),
            readers: Semaphore::new(max_readers),
            max_readers,
            value: UnsafeCell::new(value),
        }
    }

    /// Maximum number of concurrent readers
    #[inline]
    pub fn max_readers(&self) -> usize {
        self.max_readers
    }

    /// Acquire exclusive access
    pub fn lock(&self) -> WriteGuard<'_, T> {
        self.writer.acquire();
        for _ in 0..self.max_readers {
            self.readers.acquire();
        }
        WriteGuard { lock: self }
    }

    /// Acquire shared access, blocking while `max_readers` readers (or a writer) hold the lock
    pub fn read_lock(&self) -> ReadGuard<'_, T> {
        self.readers.acquire();
        ReadGuard { lock: self }
    }

    /// Acquire shared access only if a reader permit is free right now
    pub fn try_read_lock(&self) -> Option<ReadGuard<'_, T>> {
        self.readers
            .try_acquire()
            .then(|| ReadGuard { lock: self })
    }

    /// Consume the lock and return the protected value
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }

    fn unlock(&self) {
        for _ in 0..self.max_readers {
            self.readers.release();
        }
        self.writer.release();
    }

    fn read_unlock(&self) {
        self.readers.release();
    }
}

impl<T: Default> Default for ReaderWriterLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> std::fmt::Debug for ReaderWriterLock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderWriterLock")
            .field("max_readers", &self.max_readers)
            .field("free_reader_permits", &self.readers.available_permits())
            .finish_non_exhaustive()
    }
}

/// Exclusive access; released on drop or `unlock`
#[must_use = "dropping the guard releases the lock immediately"]
pub struct WriteGuard<'a, T> {
    lock: &'a ReaderWriterLock<T>,
}

impl<T> WriteGuard<'_, T> {
    /// Release the writer lock
    pub fn unlock(self) {
        drop(self);
    }
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard holds the writer permit and every reader permit
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard holds the writer permit and every reader permit
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}

/// Shared access; released on drop or `read_unlock`
#[must_use = "dropping the guard releases the lock immediately"]
pub struct ReadGuard<'a, T> {
    lock: &'a ReaderWriterLock<T>,
}

impl<T> ReadGuard<'_, T> {
    /// Release the reader permit
    pub fn read_unlock(self) {
        drop(self);
    }
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: a reader permit is held, so no writer can be active
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.read_unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_write_then_read() {
        let lock = ReaderWriterLock::new(Vec::new());
        {
            let mut guard = lock.lock();
            guard.push(1);
            guard.push(2);
        }
        assert_eq!(*lock.read_lock(), vec![1, 2]);
    }

    #[test]
    fn test_zero_bound_is_raised() {
        let lock = ReaderWriterLock::with_max_readers((), 0);
        assert_eq!(lock.max_readers(), 1);
        let _guard = lock.read_lock();
    }

    #[test]
    fn test_reader_bound_blocks_extra_reader() {
        let lock = ReaderWriterLock::with_max_readers(0u32, 2);

        let first = lock.read_lock();
        let second = lock.read_lock();
        assert!(lock.try_read_lock().is_none());

        drop(first);
        let third = lock.try_read_lock();
        assert!(third.is_some());
        drop(third);
        second.read_unlock();
    }

    #[test]
    fn test_writer_waits_for_readers() {
        let lock = Arc::new(ReaderWriterLock::with_max_readers(0u64, 4));
        let reader = lock.read_lock();

        let writer_done = Arc::new(AtomicUsize::new(0));
        let handle = {
            let lock = lock.clone();
            let writer_done = writer_done.clone();
            thread::spawn(move || {
                *lock.lock() += 1;
                writer_done.store(1, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(writer_done.load(Ordering::SeqCst), 0);

        reader.read_unlock();
        handle.join().unwrap();
        assert_eq!(*lock.read_lock(), 1);
    }

    #[test]
    fn test_concurrent_readers_never_exceed_bound() {
        const BOUND: usize = 3;
        let lock = Arc::new(ReaderWriterLock::with_max_readers((), BOUND));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let start = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lock = lock.clone();
                let active = active.clone();
                let peak = peak.clone();
                let start = start.clone();
                thread::spawn(move || {
                    start.wait();
                    for _ in 0..50 {
                        let _guard = lock.read_lock();
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        thread::yield_now();
                        active.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= BOUND);
    }
}
