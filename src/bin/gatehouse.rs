//! gatehouse - command-line client for gatehoused.

use clap::{Parser, Subcommand};
use futures_util::StreamExt;

use gatehouse::client::GatehouseClient;

/// Gatehouse CLI client
#[derive(Parser)]
#[command(name = "gatehouse")]
#[command(version = gatehouse::PKG_VERSION)]
#[command(about = "Gatehouse gRPC client")]
struct Args {
    /// Server address
    #[arg(
        short,
        long,
        env = "GATEHOUSE_ADDRESS",
        default_value = "http://127.0.0.1:8080"
    )]
    address: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Greet someone
    Greet {
        /// Name to greet
        name: String,
    },

    /// Check serving status
    Health {
        /// Service to check (empty for the whole server)
        #[arg(short, long, default_value = "")]
        service: String,
    },

    /// Stream serving status changes
    Watch {
        /// Service to watch (empty for the whole server)
        #[arg(short, long, default_value = "")]
        service: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let client = GatehouseClient::connect(&args.address).await?;

    match args.command {
        Command::Greet { name } => {
            println!("{}", client.greet(name).await?);
        }
        Command::Health { service } => {
            let status = client.check(service).await?;
            println!("{}", status.as_str_name());
        }
        Command::Watch { service } => {
            let mut updates = client.watch(service).await?;
            while let Some(update) = updates.next().await {
                println!("{}", update?.as_str_name());
            }
        }
    }

    Ok(())
}
