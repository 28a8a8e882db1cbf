//! CertChain session host.
//!
//! Connects to a wallet, keeps the session valid for the one expected
//! network and restarts everything when the wallet changes chains.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────┐  events   ┌──────────────────┐  reload   ┌───────────┐
//!   │  wallet  │──────────▶│ session manager  │──────────▶│ lifecycle │
//!   │ (JSON-   │◀──────────│ check → request  │           │ host loop │
//!   │   RPC)   │   calls   │ → signer → bind  │           └───────────┘
//!   └──────────┘           └────────┬─────────┘
//!                                   │ snapshots
//!                                   ▼
//!                            SessionView / ContractHandle
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use certchain_session::config::load_or_default;
use certchain_session::lifecycle::signals::spawn_signal_handler;
use certchain_session::lifecycle::{run_host, Application, ReloadHandle, Shutdown};
use certchain_session::observability::{logging, metrics};
use certchain_session::wallet::RpcWallet;
use certchain_session::SessionView;

#[derive(Parser)]
#[command(name = "certchain")]
#[command(about = "Wallet session host for the CertChain certificate contract", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Keep a session alive, restarting on chain changes (default)
    Run,
    /// Connect the wallet once and print the session
    Connect,
    /// Print the session after the silent auto-connect
    Status,
    /// Ask the wallet to switch to the expected network
    SwitchNetwork,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    logging::init(&config.observability);
    tracing::info!(
        chain_id = config.network.chain_id,
        network = %config.network.name,
        contract = %config.contract.address,
        "certchain v0.1.0 starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let shutdown = Shutdown::new();
            let _signals = spawn_signal_handler(shutdown.clone());
            run_host(config, cli.config.as_deref(), &shutdown).await?;
        }
        Commands::Connect => {
            let app = Application::<RpcWallet>::start(&config, ReloadHandle::new()).await?;
            app.manager().connect_wallet().await;
            print_view(&app.manager().view())?;
        }
        Commands::Status => {
            let app = Application::<RpcWallet>::start(&config, ReloadHandle::new()).await?;
            print_view(&app.manager().view())?;
        }
        Commands::SwitchNetwork => {
            let app = Application::<RpcWallet>::start(&config, ReloadHandle::new()).await?;
            if !app.manager().switch_network().await {
                eprintln!("Failed to switch network.");
            }
            print_view(&app.manager().view())?;
        }
    }

    Ok(())
}

fn print_view(view: &SessionView) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(view)?);
    Ok(())
}
