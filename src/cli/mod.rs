//! Interactive terminal front end.
//!
//! Resolves the contract and its ABI, then hands over to [`Session`].

mod prompt;
mod session;
mod table;

use std::path::Path;
use std::sync::Arc;

use alloy::json_abi::JsonAbi;
use alloy::primitives::Address;
use log::{info, warn};

use crate::abis::{load_abi_file, save_abi_file, AbiFetcher};
use crate::client::{connect_http, FunctionCaller};
use crate::config::{parse_address, Settings};
use crate::error::Result;
use crate::store::CsvAppender;

pub use prompt::{is_yes, LinePrompter, Prompter};
pub use session::Session;
pub use table::{render_pool_table, render_summary, render_value_table};

/// Run the interactive contract caller until the user quits.
pub async fn run_interactive(settings: Arc<Settings>) -> Result<()> {
    let mut prompter = LinePrompter::new()?;

    println!("\n--- Contract Function Caller ---");

    let Some(address) = resolve_contract(&settings, &mut prompter)? else {
        return Ok(());
    };
    println!("Contract: {address}");

    let fetcher = AbiFetcher::new(
        settings.explorer_api_url.clone(),
        settings.explorer_api_key.clone(),
    );
    let Some(abi) = load_abi(&settings, address, &fetcher, &mut prompter).await? else {
        println!("\nCannot proceed without ABI. Exiting.");
        return Ok(());
    };

    let caller = FunctionCaller::new(connect_http(&settings.rpc_url)?, address);
    let mut session = Session::new(
        prompter,
        caller,
        &abi,
        settings.pools()?,
        CsvAppender::new(&settings.output_file_path),
    );
    session.run().await
}

/// The configured contract, or one typed in by the user.
fn resolve_contract<P: Prompter>(settings: &Settings, prompter: &mut P) -> Result<Option<Address>> {
    if let Some(address) = settings.contract()? {
        return Ok(Some(address));
    }

    loop {
        let Some(answer) = prompter.ask("\nPlease enter the contract address: ")? else {
            return Ok(None);
        };
        match parse_address(&answer) {
            Ok(address) => return Ok(Some(address)),
            Err(e) => println!("{e}"),
        }
    }
}

/// Cached ABI file, then the block explorer, then a file path from the user.
async fn load_abi<P: Prompter>(
    settings: &Settings,
    address: Address,
    fetcher: &AbiFetcher,
    prompter: &mut P,
) -> Result<Option<JsonAbi>> {
    let cache = Path::new(&settings.abi_cache_path);

    if cache.exists() {
        match load_abi_file(cache) {
            Ok(abi) => {
                info!("Loaded ABI from {}", cache.display());
                return Ok(Some(abi));
            }
            Err(e) => warn!("Error loading ABI file, fetching again: {}", e),
        }
    }

    println!("No ABI available. Fetching contract ABI...");
    match fetcher.fetch_abi(address).await {
        Ok(abi) => {
            println!("Contract ABI fetched successfully!");
            cache_abi(cache, &abi);
            return Ok(Some(abi));
        }
        Err(e) => println!("Failed to fetch ABI: {e}"),
    }

    if prompter.confirm("\nWould you like to provide the contract ABI manually? (y/n): ")? != Some(true) {
        return Ok(None);
    }
    let Some(path) = prompter.ask("\nEnter the file path to your ABI JSON file: ")? else {
        return Ok(None);
    };

    match load_abi_file(path.trim()) {
        Ok(abi) => {
            cache_abi(cache, &abi);
            Ok(Some(abi))
        }
        Err(e) => {
            println!("Error reading ABI file: {e}");
            Ok(None)
        }
    }
}

fn cache_abi(cache: &Path, abi: &JsonAbi) {
    match save_abi_file(cache, abi) {
        Ok(()) => info!("ABI saved to {}", cache.display()),
        Err(e) => warn!("Could not save ABI to {}: {}", cache.display(), e),
    }
}
