mod config;

pub use self::config::{parse_address, Settings, DEFAULT_REWARDS_CONTRACT};
