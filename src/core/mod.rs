/*!
 * Core Module
 * Fundamental types, limits, error handling, and synchronization primitives
 */

pub mod errors;
pub mod limits;
pub mod sync;

// Re-export for convenience
pub use errors::*;
pub use sync::{ReadGuard, ReaderWriterLock, Semaphore, WriteGuard};
