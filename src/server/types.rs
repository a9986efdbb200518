/*!
 * Server Types
 * Requests, tasks, and responses exchanged with the codec
 */

use crate::timeline::Record;
use serde::{Deserialize, Serialize};

/// Client-chosen request identifier, echoed in the response
pub type RequestId = i64;

/// Operation requested against the timeline
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add { body: String, timestamp: f64 },
    Remove { timestamp: f64 },
    Contains { timestamp: f64 },
    Feed,
    /// Unrecognized command name; answered with `success = false`
    Unknown(String),
}

impl Command {
    /// Wire name of the command
    pub fn name(&self) -> &str {
        match self {
            Command::Add { .. } => "ADD",
            Command::Remove { .. } => "REMOVE",
            Command::Contains { .. } => "CONTAINS",
            Command::Feed => "FEED",
            Command::Unknown(name) => name,
        }
    }
}

/// A unit of work handed from the reader to a worker
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: RequestId,
    pub command: Command,
}

impl Task {
    pub fn new(id: RequestId, command: Command) -> Self {
        Self { id, command }
    }
}

/// Decoded request
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Task(Task),
    /// Termination marker; never answered
    Done,
}

/// Response written for every answered request
///
/// Serializes as `{"id": .., "feed": [..]}` or `{"success": .., "id": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Feed { id: RequestId, feed: Vec<Record> },
    Ack { success: bool, id: RequestId },
}

impl Response {
    pub fn ack(id: RequestId, success: bool) -> Self {
        Response::Ack { success, id }
    }

    pub fn id(&self) -> RequestId {
        match self {
            Response::Feed { id, .. } | Response::Ack { id, .. } => *id,
        }
    }
}

/// Counters reported when a run finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Responses written successfully
    pub answered: u64,
    /// Requests skipped because they could not be decoded
    pub malformed: u64,
    /// Responses lost because the encoder failed
    pub write_failures: u64,
}
