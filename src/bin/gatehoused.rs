//! gatehoused - Gatehouse daemon.
//!
//! Serves the greeter over gRPC and the transcoded HTTP/JSON gateway until
//! SIGINT or SIGTERM, then drains both servers.

use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use gatehouse::server::config::LoggingConfig;
use gatehouse::{Config, Gatehouse, Handlers, Lifecycle, logging};

/// Gatehouse daemon: greeter over gRPC and HTTP/JSON.
#[derive(Parser)]
#[command(name = "gatehoused")]
#[command(version = gatehouse::PKG_VERSION)]
#[command(about = "Gatehouse gRPC + HTTP gateway daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// gRPC listener address (overrides the config file).
    #[arg(long, env = "GATEHOUSE_RPC_ADDRESS")]
    rpc_address: Option<String>,

    /// HTTP gateway address (overrides the config file).
    #[arg(long, env = "GATEHOUSE_HTTP_ADDRESS")]
    http_address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_config(args) {
        Ok(config) => config,
        Err(e) => {
            // No config means no logging settings yet; report with the defaults.
            logging::init(&LoggingConfig::default());
            error!(error = %e, "failed to load configuration");
            return Err(e.into());
        }
    };

    logging::init(&config.logging);
    info!(version = gatehouse::PKG_VERSION, "gatehoused starting");

    let handlers = Handlers::with_policy(Gatehouse::new(), config.validation.policy);
    let report = Lifecycle::new(config, handlers)
        .run(shutdown_signal())
        .await
        .inspect_err(|e| error!(error = %e, "gatehoused failed"))?;

    info!(http = ?report.http, grpc = ?report.rpc, "gatehoused stopped");
    Ok(())
}

/// Load the config file and apply command-line overrides.
fn load_config(args: Args) -> gatehouse::Result<Config> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(addr) = args.rpc_address {
        config.server.rpc_address = addr;
    }
    if let Some(addr) = args.http_address {
        config.server.http_address = addr;
    }
    Ok(config)
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C"),
        _ = terminate => info!("received SIGTERM"),
    }
}
