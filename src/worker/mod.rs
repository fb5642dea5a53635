//! Sequential call orchestration.
//!
//! Every batch runs one call at a time and awaits it before starting the
//! next; there is no retry, timeout or cancellation at this layer.

mod pool_query;
mod recorder;
mod value_batch;

pub use pool_query::query_pools;
pub use recorder::CsvRecorder;
pub use value_batch::{call_once, query_values};
