/*!
 * Timeline
 * Timestamp-ordered chain of posts behind a bounded reader/writer lock
 */

use super::types::{Post, Record};
use crate::core::limits::{DEFAULT_MAX_READERS, HEAD_SENTINEL_TIMESTAMP, TAIL_SENTINEL_TIMESTAMP};
use crate::core::sync::ReaderWriterLock;
use tracing::trace;

/// Sentinel-bounded singly-linked chain, newest first
///
/// `head` (+inf) owns the first post, each post owns its successor, and the
/// last link is always the tail sentinel (-inf). The tail is the only node
/// without a successor, which is how scans recognize it.
struct Chain {
    head: Post,
    len: usize,
}

impl Chain {
    fn new() -> Self {
        let tail = Post::new(String::new(), TAIL_SENTINEL_TIMESTAMP, None);
        Self {
            head: Post::new(String::new(), HEAD_SENTINEL_TIMESTAMP, Some(Box::new(tail))),
            len: 0,
        }
    }

    /// The last node whose successor is not newer than `timestamp`
    fn predecessor(&self, timestamp: f64) -> &Post {
        let mut current = &self.head;
        while let Some(next) = current
            .next
            .as_deref()
            .filter(|next| next.timestamp > timestamp)
        {
            current = next;
        }
        current
    }

    fn predecessor_mut(&mut self, timestamp: f64) -> &mut Post {
        let mut current = &mut self.head;
        while current.next_is_newer_than(timestamp) {
            current = match current.next {
                Some(ref mut next) => &mut **next,
                None => break,
            };
        }
        current
    }

    /// Whether `pred`'s successor is a real post stamped exactly `timestamp`
    fn successor_matches(pred: &Post, timestamp: f64) -> bool {
        pred.next
            .as_deref()
            .is_some_and(|next| next.timestamp == timestamp && next.next.is_some())
    }
}

impl Drop for Chain {
    fn drop(&mut self) {
        // Unlink iteratively; recursive Box drops overflow the stack on long chains
        let mut next = self.head.next.take();
        while let Some(mut post) = next {
            next = post.next.take();
        }
    }
}

/// Concurrent timeline of posts ordered by descending timestamp
///
/// Writers (`insert`, `remove`) are serialized; up to `max_readers` readers
/// (`contains`, `snapshot`, `len`) run at once. Every operation walks the
/// chain from the head, so all of them are O(n) in the number of posts.
///
/// Timestamps are not required to be unique. Among equal timestamps the most
/// recently inserted post comes first, and `remove` deletes that one.
pub struct Timeline {
    chain: ReaderWriterLock<Chain>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::with_max_readers(DEFAULT_MAX_READERS)
    }

    /// Timeline whose lock admits at most `max_readers` concurrent readers
    pub fn with_max_readers(max_readers: usize) -> Self {
        Self {
            chain: ReaderWriterLock::with_max_readers(Chain::new(), max_readers),
        }
    }

    /// Insert a post, keeping the chain sorted newest first
    pub fn insert(&self, body: impl Into<String>, timestamp: f64) {
        debug_assert!(!timestamp.is_nan(), "NaN timestamps cannot be ordered");

        let mut chain = self.chain.lock();
        let pred = chain.predecessor_mut(timestamp);
        let rest = pred.next.take();
        pred.next = Some(Box::new(Post::new(body.into(), timestamp, rest)));
        chain.len += 1;
        trace!(timestamp, len = chain.len, "post inserted");
    }

    /// Remove the first post stamped exactly `timestamp`
    ///
    /// Returns `false` when no such post exists.
    pub fn remove(&self, timestamp: f64) -> bool {
        let mut chain = self.chain.lock();
        let pred = chain.predecessor_mut(timestamp);
        if !Chain::successor_matches(pred, timestamp) {
            return false;
        }

        if let Some(mut removed) = pred.next.take() {
            pred.next = removed.next.take();
        }
        chain.len -= 1;
        trace!(timestamp, len = chain.len, "post removed");
        true
    }

    /// Whether a post stamped exactly `timestamp` exists
    pub fn contains(&self, timestamp: f64) -> bool {
        let chain = self.chain.read_lock();
        Chain::successor_matches(chain.predecessor(timestamp), timestamp)
    }

    /// All posts, newest first
    pub fn snapshot(&self) -> Vec<Record> {
        let chain = self.chain.read_lock();
        let mut records = Vec::with_capacity(chain.len);

        let mut current = chain.head.next.as_deref();
        while let Some(post) = current {
            if post.next.is_none() {
                break; // tail sentinel
            }
            records.push(post.to_record());
            current = post.next.as_deref();
        }
        records
    }

    /// Number of posts (sentinels excluded)
    pub fn len(&self) -> usize {
        self.chain.read_lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reader bound of the underlying lock
    pub fn max_readers(&self) -> usize {
        self.chain.max_readers()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("len", &self.len())
            .field("max_readers", &self.max_readers())
            .finish()
    }
}
