pub mod explorer;
pub mod functions;
pub mod params;
pub mod rewards;

pub use explorer::{load_abi_file, parse_abi, save_abi_file, AbiFetcher};
pub use functions::{describe, input_label, input_names, is_pool_epoch_call, read_functions};
pub use params::{parse_uint, render_value, render_values, ParamKind};
pub use rewards::{compute_rewards_input_names, IRewardsDistributor, COMPUTE_REWARDS};
