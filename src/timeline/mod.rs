/*!
 * Timeline Module
 *
 * Mutable, timestamp-ordered collection of posts shared between workers.
 *
 * # Architecture
 *
 * - Singly-linked chain between two permanent sentinels (+inf head, -inf tail)
 * - Each post owned by its predecessor; the sentinels by the timeline
 * - Guarded by a bounded `ReaderWriterLock` (writers serialized, N readers)
 */

mod timeline;
mod types;

pub use timeline::Timeline;
pub use types::Record;
