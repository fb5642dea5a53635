pub mod abis;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod store;
pub mod utils;
pub mod worker;

pub use self::config::Settings;
pub use client::{FunctionCaller, RewardsContract, RewardsSource};
pub use error::{Result, RewardsError};
pub use models::{PoolEntry, PoolSet, QueryResult};
pub use store::CsvAppender;
