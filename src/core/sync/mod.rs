/*!
 * Synchronization Primitives
 *
 * Blocking primitives used to guard the timeline:
 * - Counting semaphore (parking_lot mutex + condvar, no busy-waiting)
 * - Bounded reader/writer lock built from two semaphores
 *
 * # Use Cases
 *
 * - **Timeline access**: writers serialized, at most N readers at once
 * - **Admission control**: any resource with a fixed number of permits
 */

mod rwlock;
mod semaphore;

pub use rwlock::{ReadGuard, ReaderWriterLock, WriteGuard};
pub use semaphore::Semaphore;
