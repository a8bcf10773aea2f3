//! Terraform provider binary for Sleuth.
//!
//! Configured entirely from the environment (`SLEUTH_API_KEY`,
//! `SLEUTH_BASEURL`); serves the resource registry over the stdio host
//! harness until the host closes the stream.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sleuth_provider::{host, ProviderConfig, SleuthProvider};

#[derive(Parser)]
#[command(name = "terraform-provider-sleuth")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terraform provider for Sleuth deployment tracking", long_about = None)]
struct Cli {
    /// Run standalone for debugger attachment instead of waiting for the
    /// host to launch the plugin
    #[arg(long)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    if cli.json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .json()
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let provider = SleuthProvider::configure(ProviderConfig::from_env())
        .context("failed to configure the sleuth provider")?;

    if cli.debug {
        info!("running in debug mode; attach the host to this process");
    }

    host::serve(Arc::new(provider))
        .await
        .context("host harness terminated")?;
    Ok(())
}
