/*!
 * Timeline Server Library
 * Concurrent timestamp-ordered feed served by a producer/worker pool
 */

pub mod core;
pub mod monitoring;
pub mod queue;
pub mod server;
pub mod timeline;

// Re-exports
pub use crate::core::errors::{CodecError, ConfigError, ServerError};
pub use crate::core::sync::{ReaderWriterLock, Semaphore};
pub use monitoring::init_tracing;
pub use queue::TaskQueue;
pub use server::{run, Mode, ServerConfig};
pub use timeline::{Record, Timeline};
