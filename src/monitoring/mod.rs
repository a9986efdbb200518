/*!
 * Monitoring
 * Structured tracing setup and spans
 */

mod tracer;

pub use tracer::{init_tracing, span_worker};
