/*!
 * Lock-Free Task Queue
 *
 * Michael–Scott unbounded MPMC FIFO with epoch-based reclamation.
 *
 * # Layout
 *
 * `head` always points at a sentinel whose payload has already been taken
 * (or never existed). The first live item sits in `head.next`. Dequeue
 * swings `head` forward one node; the node it lands on becomes the new
 * sentinel after its payload is moved out.
 *
 * # Performance
 *
 * - **Enqueue/dequeue**: lock-free, one successful CAS each on the fast path
 * - **Memory reclamation**: retired sentinels deferred via crossbeam-epoch
 */

use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicIsize, Ordering};

struct Node<T> {
    /// Initialized for every node except the initial sentinel; moved out
    /// exactly once by the dequeuer that promotes the node to sentinel
    data: MaybeUninit<T>,
    next: Atomic<Node<T>>,
}

impl<T> Node<T> {
    fn sentinel() -> Self {
        Self {
            data: MaybeUninit::uninit(),
            next: Atomic::null(),
        }
    }

    fn with_data(data: T) -> Self {
        Self {
            data: MaybeUninit::new(data),
            next: Atomic::null(),
        }
    }
}

/// Unbounded lock-free FIFO safe for many producers and many consumers
///
/// The size counter is updated separately from the CAS that links or
/// unlinks a node, so [`TaskQueue::len`] is a hint only. Emptiness is
/// decided by [`TaskQueue::dequeue`] or [`TaskQueue::is_empty`].
pub struct TaskQueue<T> {
    head: Atomic<Node<T>>,
    tail: Atomic<Node<T>>,
    size: AtomicIsize,
}

// SAFETY: items are moved between threads, never shared
unsafe impl<T: Send> Send for TaskQueue<T> {}
unsafe impl<T: Send> Sync for TaskQueue<T> {}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        let queue = Self {
            head: Atomic::null(),
            tail: Atomic::null(),
            size: AtomicIsize::new(0),
        };

        // SAFETY: the queue is not shared yet
        let guard = unsafe { epoch::unprotected() };
        let sentinel = Owned::new(Node::sentinel()).into_shared(guard);
        queue.head.store(sentinel, Ordering::Relaxed);
        queue.tail.store(sentinel, Ordering::Relaxed);
        queue
    }

    /// Append an item at the tail
    pub fn enqueue(&self, item: T) {
        let guard = &epoch::pin();
        let mut node = Owned::new(Node::with_data(item));

        loop {
            let tail = self.tail.load(Ordering::Acquire, guard);
            // SAFETY: tail is never null and is protected by the pinned guard
            let tail_ref = unsafe { tail.deref() };
            let next = tail_ref.next.load(Ordering::Acquire, guard);

            if !next.is_null() {
                // Tail is lagging; help it forward and retry
                let _ = self.tail.compare_exchange(
                    tail,
                    next,
                    Ordering::Release,
                    Ordering::Relaxed,
                    guard,
                );
                continue;
            }

            match tail_ref.next.compare_exchange(
                Shared::null(),
                node,
                Ordering::Release,
                Ordering::Relaxed,
                guard,
            ) {
                Ok(linked) => {
                    // Failure here means another thread already advanced it
                    let _ = self.tail.compare_exchange(
                        tail,
                        linked,
                        Ordering::Release,
                        Ordering::Relaxed,
                        guard,
                    );
                    break;
                }
                Err(err) => node = err.new,
            }
        }

        self.size.fetch_add(1, Ordering::Relaxed);
    }

    /// Take the item at the head, or `None` if the queue is empty
    pub fn dequeue(&self) -> Option<T> {
        let guard = &epoch::pin();

        loop {
            let head = self.head.load(Ordering::Acquire, guard);
            // SAFETY: head is never null and is protected by the pinned guard
            let next = unsafe { head.deref() }.next.load(Ordering::Acquire, guard);
            // SAFETY: non-null nodes reachable from head stay alive while pinned
            let next_ref = unsafe { next.as_ref() }?;

            if self
                .head
                .compare_exchange(head, next, Ordering::Release, Ordering::Relaxed, guard)
                .is_ok()
            {
                self.retire(head, next, guard);
                self.size.fetch_sub(1, Ordering::Relaxed);
                // SAFETY: winning the CAS grants sole ownership of next's payload
                return Some(unsafe { next_ref.data.assume_init_read() });
            }
        }
    }

    /// Structural emptiness check at the instant of the call
    pub fn is_empty(&self) -> bool {
        let guard = &epoch::pin();
        let head = self.head.load(Ordering::Acquire, guard);
        // SAFETY: head is never null and is protected by the pinned guard
        unsafe { head.deref() }
            .next
            .load(Ordering::Acquire, guard)
            .is_null()
    }

    /// Advisory item count; may lag concurrent enqueues and dequeues
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed).max(0) as usize
    }

    /// Free the old sentinel once no pinned thread can still see it
    fn retire<'g>(&self, old_head: Shared<'g, Node<T>>, new_head: Shared<'g, Node<T>>, guard: &'g Guard) {
        // The tail must never point at a retired node
        let tail = self.tail.load(Ordering::Acquire, guard);
        if tail == old_head {
            let _ = self.tail.compare_exchange(
                tail,
                new_head,
                Ordering::Release,
                Ordering::Relaxed,
                guard,
            );
        }
        // SAFETY: old_head is unlinked from head; its payload was taken earlier
        unsafe { guard.defer_destroy(old_head) };
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for TaskQueue<T> {
    fn drop(&mut self) {
        while self.dequeue().is_some() {}

        // SAFETY: &mut self means no other thread can access the queue
        unsafe {
            let guard = epoch::unprotected();
            let sentinel = self.head.load(Ordering::Relaxed, guard);
            drop(sentinel.into_owned());
        }
    }
}

impl<T> std::fmt::Debug for TaskQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("len", &self.len())
            .field("is_empty", &self.is_empty())
            .finish()
    }
}
