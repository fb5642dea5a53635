use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use jemallocator::Jemalloc;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use epoch_rewards::{
    abis::{compute_rewards_input_names, parse_uint, COMPUTE_REWARDS},
    cli::{render_pool_table, render_summary, run_interactive},
    client::connect_http,
    models::BatchSummary,
    server::{self, ApiState},
    worker::{query_pools, CsvRecorder},
    CsvAppender, RewardsContract, Settings,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Epoch rewards lookup for on-chain pools", long_about = None)]
struct Cli {
    /// Configuration file, extension optional
    #[arg(long, default_value = "config")]
    config: String,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pick and call read functions of a contract (default)
    Interactive,
    /// Serve the rewards web form
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Query every configured pool for one epoch
    Query {
        #[arg(long)]
        epoch: String,
        /// Do not append results to the CSV log
        #[arg(long)]
        no_csv: bool,
    },
}

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    SimpleLogger::new()
        .with_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init()
        .context("Failed to initialize logger")?;

    let settings = Arc::new(
        Settings::load(&cli.config)
            .with_context(|| format!("Failed to load configuration from {}", cli.config))?,
    );

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => run_interactive(settings)
            .await
            .context("Interactive session failed"),
        Command::Serve { bind } => run_server(settings, bind).await,
        Command::Query { epoch, no_csv } => run_query(settings, &epoch, no_csv).await,
    }
}

fn rewards_contract(settings: &Settings) -> anyhow::Result<RewardsContract> {
    let address = settings
        .rewards_contract()
        .context("Invalid contract address")?;
    let provider = connect_http(&settings.rpc_url).context("Failed to create RPC provider")?;
    Ok(RewardsContract::new(address, provider))
}

async fn run_query(settings: Arc<Settings>, epoch: &str, no_csv: bool) -> anyhow::Result<()> {
    let epoch = parse_uint(epoch).context("Invalid epoch")?;
    let pools = settings.pools().context("Invalid pool configuration")?;
    let contract = rewards_contract(&settings)?;

    let recorder = (!no_csv).then(|| {
        CsvRecorder::new(
            CsvAppender::new(&settings.output_file_path),
            COMPUTE_REWARDS,
            compute_rewards_input_names(),
        )
    });

    info!("Querying {} at {}", COMPUTE_REWARDS, contract.address());
    let results = query_pools(&contract, &pools, epoch, recorder.as_ref()).await?;

    println!("\n{}", render_pool_table(&results));
    println!(
        "{}",
        render_summary("PROCESSING SUMMARY", &BatchSummary::from(results.as_slice()))
    );
    if let Some(recorder) = &recorder {
        println!("Results saved to {}", recorder.appender().path().display());
    }
    Ok(())
}

async fn run_server(settings: Arc<Settings>, bind: Option<String>) -> anyhow::Result<()> {
    let pools = settings.pools().context("Invalid pool configuration")?;
    let state = ApiState {
        source: Arc::new(rewards_contract(&settings)?),
        pools: Arc::new(pools),
    };
    let bind = bind.unwrap_or_else(|| settings.bind_address.clone());

    let listener = server::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind web server to {bind}"))?;

    let cancellation_token = CancellationToken::new();
    let server_token = cancellation_token.child_token();
    let mut server_handle = tokio::spawn(server::serve(listener, state, server_token));

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Server running. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
            result = &mut server_handle => {
                return server_exit(result);
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            result = &mut server_handle => {
                return server_exit(result);
            },
        };
    }

    cancellation_token.cancel();

    info!("Waiting for web server to stop...");
    server_exit(server_handle.await)
}

fn server_exit(
    result: Result<epoch_rewards::Result<()>, tokio::task::JoinError>,
) -> anyhow::Result<()> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            error!("Web server failed: {:#}", e);
            Err(e).context("Web server failed")
        }
        Err(e) => Err(e).context("Web server task panicked"),
    }
}
