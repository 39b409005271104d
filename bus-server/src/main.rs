use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use bus_server::cli::Cli;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "bus_server=info,tower_http=info";

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        error!(error = %e, "bus-server failed");
        std::process::exit(1);
    }
}
