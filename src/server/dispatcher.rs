/*!
 * Dispatcher
 *
 * Sequential mode applies each request on the reading thread. Parallel mode
 * runs the reader as producer and a pool of scoped worker threads as
 * consumers, joined through the lock-free task queue.
 *
 * Responses from different workers may be written in any order.
 */

use super::codec::{RequestDecoder, ResponseEncoder};
use super::config::{Mode, ServerConfig};
use super::context::{DispatchContext, ResponseSink};
use super::types::{Command, Request, Response, RunSummary, Task};
use crate::core::errors::{ServerError, ServerResult};
use crate::core::limits::WORKER_THREAD_PREFIX;
use crate::monitoring::span_worker;
use crate::timeline::Timeline;
use std::thread::{self, ScopedJoinHandle};
use tracing::{debug, error, info, trace, warn};

/// Apply one task to the timeline and build its response
pub fn process(timeline: &Timeline, task: Task) -> Response {
    let Task { id, command } = task;
    trace!(id, command = command.name(), "Processing task");
    match command {
        Command::Add { body, timestamp } => {
            timeline.insert(body, timestamp);
            Response::ack(id, true)
        }
        Command::Remove { timestamp } => Response::ack(id, timeline.remove(timestamp)),
        Command::Contains { timestamp } => Response::ack(id, timeline.contains(timestamp)),
        Command::Feed => Response::Feed {
            id,
            feed: timeline.snapshot(),
        },
        Command::Unknown(name) => {
            warn!(id, command = %name, "Unknown command");
            Response::ack(id, false)
        }
    }
}

/// Serve requests from `decoder` until `DONE` or end of input
pub fn run<D, E>(config: &ServerConfig, mut decoder: D, encoder: E) -> ServerResult<RunSummary>
where
    D: RequestDecoder,
    E: ResponseEncoder,
{
    let timeline = Timeline::with_max_readers(config.max_readers);
    info!(
        mode = ?config.mode,
        max_readers = timeline.max_readers(),
        "Timeline server starting"
    );

    let summary = match config.mode {
        Mode::Sequential => run_sequential(&timeline, &mut decoder, encoder),
        Mode::Parallel { workers } => run_parallel(timeline, workers, &mut decoder, encoder)?,
    };

    info!(
        answered = summary.answered,
        malformed = summary.malformed,
        write_failures = summary.write_failures,
        "Timeline server finished"
    );
    Ok(summary)
}

/// Single loop: decode, apply, answer; output order matches input order
pub fn run_sequential<D, E>(timeline: &Timeline, decoder: &mut D, encoder: E) -> RunSummary
where
    D: RequestDecoder + ?Sized,
    E: ResponseEncoder,
{
    let sink = ResponseSink::new(encoder);

    while let Some(decoded) = decoder.next_request() {
        match decoded {
            Ok(Request::Done) => {
                debug!("Termination marker received");
                break;
            }
            Ok(Request::Task(task)) => sink.send(&process(timeline, task)),
            Err(err) => sink.record_malformed(&err),
        }
    }

    sink.summary()
}

/// Producer on the calling thread, `workers` consumers on scoped threads
pub fn run_parallel<D, E>(
    timeline: Timeline,
    workers: usize,
    decoder: &mut D,
    encoder: E,
) -> ServerResult<RunSummary>
where
    D: RequestDecoder + ?Sized,
    E: ResponseEncoder,
{
    let ctx = DispatchContext::new(timeline, encoder);
    let workers = workers.max(1);

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let ctx = &ctx;
            let spawned = thread::Builder::new()
                .name(format!("{WORKER_THREAD_PREFIX}-{worker}"))
                .spawn_scoped(scope, move || worker_loop(ctx, worker));

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    error!(worker, error = %err, "Failed to spawn worker");
                    ctx.begin_shutdown();
                    join_workers(handles);
                    return Err(ServerError::Spawn(err));
                }
            }
        }
        debug!(workers, "Worker pool started");

        produce(&ctx, decoder);
        join_workers(handles);
        Ok(())
    })?;

    Ok(ctx.summary())
}

/// Read requests and queue them until `DONE` or end of input, then begin shutdown
fn produce<D, E>(ctx: &DispatchContext<E>, decoder: &mut D)
where
    D: RequestDecoder + ?Sized,
    E: ResponseEncoder,
{
    while let Some(decoded) = decoder.next_request() {
        match decoded {
            Ok(Request::Done) => {
                debug!("Termination marker received");
                break;
            }
            Ok(Request::Task(task)) => ctx.submit(task),
            Err(err) => ctx.sink().record_malformed(&err),
        }
    }

    ctx.begin_shutdown();
}

fn worker_loop<E: ResponseEncoder>(ctx: &DispatchContext<E>, worker: usize) {
    let _span = span_worker(worker).entered();
    debug!("Worker started");
    let mut handled = 0u64;

    while let Some(task) = ctx.next_task() {
        let response = process(ctx.timeline(), task);
        ctx.sink().send(&response);
        handled += 1;
    }

    debug!(handled, "Worker exiting");
}

fn join_workers(handles: Vec<ScopedJoinHandle<'_, ()>>) {
    for handle in handles {
        if handle.join().is_err() {
            error!("Worker thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Record;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_process_each_command() {
        let timeline = Timeline::new();

        let add = process(
            &timeline,
            Task::new(
                1,
                Command::Add {
                    body: "hi".into(),
                    timestamp: 5.0,
                },
            ),
        );
        assert_eq!(add, Response::ack(1, true));

        assert_eq!(
            process(&timeline, Task::new(2, Command::Contains { timestamp: 5.0 })),
            Response::ack(2, true)
        );
        assert_eq!(
            process(&timeline, Task::new(3, Command::Feed)),
            Response::Feed {
                id: 3,
                feed: vec![Record::new("hi", 5.0)]
            }
        );
        assert_eq!(
            process(&timeline, Task::new(4, Command::Remove { timestamp: 5.0 })),
            Response::ack(4, true)
        );
        assert_eq!(
            process(&timeline, Task::new(5, Command::Remove { timestamp: 5.0 })),
            Response::ack(5, false)
        );
        assert_eq!(
            process(&timeline, Task::new(6, Command::Unknown("LIKE".into()))),
            Response::ack(6, false)
        );
    }
}
