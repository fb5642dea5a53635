mod pool;
mod query;

pub use pool::{PoolEntry, PoolSet, CUSTOM_POOL_NAME, DEFAULT_POOL_IDS, DEFAULT_POOL_NAMES};
pub use query::{BatchSummary, QueryResult, ValueResult};
