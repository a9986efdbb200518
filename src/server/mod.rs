/*!
 * Timeline Server
 *
 * Request intake and dispatch:
 * - Codec traits with a streaming JSON implementation
 * - Launch configuration (sequential or parallel mode)
 * - Shared dispatch context (timeline, task queue, wakeup, response sink)
 * - Sequential loop and producer/worker-pool dispatcher
 */

pub mod codec;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod types;

// Re-export public API
pub use codec::{JsonRequestDecoder, JsonResponseEncoder, RequestDecoder, ResponseEncoder};
pub use config::{Mode, ServerConfig};
pub use context::{DispatchContext, ResponseSink};
pub use dispatcher::{process, run, run_parallel, run_sequential};
pub use types::{Command, Request, RequestId, Response, RunSummary, Task};
