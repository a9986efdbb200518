/*!
 * Dispatch Context
 *
 * Shared state of one run, handed by reference to the reader and every
 * worker: the timeline, the task queue, the shutdown flag, the idle
 * mutex/condvar pair, and the serialized response sink.
 */

use super::codec::ResponseEncoder;
use super::types::{Response, RunSummary, Task};
use crate::core::errors::CodecError;
use crate::queue::TaskQueue;
use crate::timeline::Timeline;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, error, warn};

/// Response encoder behind a mutex, plus run counters
///
/// Each response is encoded and written while the mutex is held, so
/// concurrent workers never interleave partial output.
pub struct ResponseSink<E> {
    encoder: Mutex<E>,
    answered: AtomicU64,
    malformed: AtomicU64,
    write_failures: AtomicU64,
}

impl<E: ResponseEncoder> ResponseSink<E> {
    pub fn new(encoder: E) -> Self {
        Self {
            encoder: Mutex::new(encoder),
            answered: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
        }
    }

    /// Write one response; failures are logged and counted, never propagated
    pub fn send(&self, response: &Response) {
        let result = self.encoder.lock().encode(response);
        match result {
            Ok(()) => {
                self.answered.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                self.write_failures.fetch_add(1, Ordering::Relaxed);
                error!(id = response.id(), error = %err, "Failed to write response");
            }
        }
    }

    /// Note a request that was skipped because it could not be decoded
    pub fn record_malformed(&self, err: &CodecError) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
        warn!(error = %err, "Skipping undecodable request");
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            answered: self.answered.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

/// State shared by the producer and the worker pool
pub struct DispatchContext<E> {
    timeline: Timeline,
    queue: TaskQueue<Task>,
    shutdown: AtomicBool,
    idle: Mutex<()>,
    work_available: Condvar,
    sink: ResponseSink<E>,
}

impl<E: ResponseEncoder> DispatchContext<E> {
    pub fn new(timeline: Timeline, encoder: E) -> Self {
        Self {
            timeline,
            queue: TaskQueue::new(),
            shutdown: AtomicBool::new(false),
            idle: Mutex::new(()),
            work_available: Condvar::new(),
            sink: ResponseSink::new(encoder),
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn sink(&self) -> &ResponseSink<E> {
        &self.sink
    }

    /// Queue a task and wake one idle worker
    ///
    /// The idle mutex is taken around the notify so a worker that just saw
    /// an empty queue is either already waiting or will see the new task.
    pub fn submit(&self, task: Task) {
        let id = task.id;
        self.queue.enqueue(task);
        debug!(id, queued = self.queue.len(), "Task queued");

        let _idle = self.idle.lock();
        self.work_available.notify_one();
    }

    /// Stop accepting work and wake every worker so they drain and exit
    pub fn begin_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);

        let _idle = self.idle.lock();
        self.work_available.notify_all();
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Block until a task is available
    ///
    /// Returns `None` only once shutdown has begun and the queue is empty,
    /// so every task submitted before shutdown is handed out.
    pub fn next_task(&self) -> Option<Task> {
        loop {
            if let Some(task) = self.queue.dequeue() {
                return Some(task);
            }

            let mut idle = self.idle.lock();
            if !self.queue.is_empty() {
                continue; // raced with a submit; retry the dequeue
            }
            if self.is_shutting_down() {
                return None;
            }
            self.work_available.wait(&mut idle);
        }
    }

    pub fn summary(&self) -> RunSummary {
        self.sink.summary()
    }
}
