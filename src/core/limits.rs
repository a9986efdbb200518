/*!
 * System Limits and Constants
 *
 * Centralized location for the server's limits, thresholds, and environment keys.
 * Organized by domain for maintainability and discoverability.
 */

// =============================================================================
// TIMELINE LOCKING
// =============================================================================

/// Default number of concurrent reader permits on the timeline lock (32)
/// The (N+1)-th reader blocks even while no writer holds the lock
pub const DEFAULT_MAX_READERS: usize = 32;

/// Permits on the writer semaphore
/// Writers are strictly serialized
pub const WRITER_PERMITS: usize = 1;

// =============================================================================
// TIMELINE SENTINELS
// =============================================================================

/// Timestamp of the head sentinel; every post sorts below it
pub const HEAD_SENTINEL_TIMESTAMP: f64 = f64::INFINITY;

/// Timestamp of the tail sentinel; every post sorts above it
pub const TAIL_SENTINEL_TIMESTAMP: f64 = f64::NEG_INFINITY;

// =============================================================================
// DISPATCHER
// =============================================================================

/// Upper bound on worker threads accepted from the command line
/// Guards against typos such as an extra digit spawning thousands of threads
pub const MAX_WORKERS: usize = 1024;

/// Prefix for worker thread names (`timeline-worker-3`)
pub const WORKER_THREAD_PREFIX: &str = "timeline-worker";

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Overrides the reader permit count
pub const ENV_MAX_READERS: &str = "TIMELINE_MAX_READERS";

/// Switches log output to JSON when set to `1` or `true`
pub const ENV_TRACE_JSON: &str = "TIMELINE_TRACE_JSON";
