//! `ts`: natural language to Terraform for Cloudflare.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ts_cli::cli::Cli;
use ts_cli::commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.compact().init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "ts starting");

    commands::run(cli).await
}
