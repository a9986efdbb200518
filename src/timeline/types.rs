/*!
 * Timeline Types
 * Linked posts and their read-only projection
 */

use serde::{Deserialize, Serialize};

/// A post in the chain, owned by its predecessor
#[derive(Debug)]
pub(super) struct Post {
    pub body: String,
    pub timestamp: f64,
    pub next: Option<Box<Post>>,
}

impl Post {
    pub fn new(body: String, timestamp: f64, next: Option<Box<Post>>) -> Self {
        Self {
            body,
            timestamp,
            next,
        }
    }

    /// Whether the scan for `timestamp` should step past this post's successor
    #[inline]
    pub fn next_is_newer_than(&self, timestamp: f64) -> bool {
        self.next
            .as_ref()
            .is_some_and(|next| next.timestamp > timestamp)
    }

    pub fn to_record(&self) -> Record {
        Record {
            body: self.body.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// Externally visible projection of a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub body: String,
    pub timestamp: f64,
}

impl Record {
    pub fn new(body: impl Into<String>, timestamp: f64) -> Self {
        Self {
            body: body.into(),
            timestamp,
        }
    }
}
