/*!
 * Concurrent Task Queue
 *
 * Lock-free hand-off between the request reader and the worker pool.
 * The reader never blocks on worker availability; workers pull tasks
 * whenever they are idle.
 */

mod lockfree;

pub use lockfree::TaskQueue;
