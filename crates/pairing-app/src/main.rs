//! Pairing client entry point
//!
//! Run with:
//! ```bash
//! cargo run -p pairing-app -- --email you@example.com pairings
//! ```
//!
//! Endpoints are loaded from environment variables or a `.env` file.

use clap::Parser;
use pairing_app::cli::{self, Cli};
use pairing_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let cli = Cli::parse();
    let output = cli.output;
    if let Err(e) = run(cli).await {
        let failure = cli::failure(e);
        error!(error = %failure, code = failure.error_code(), "Command failed");
        cli::print_failure(&failure, output);
        std::process::exit(failure.exit_code());
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        graphql = %config.graphql.http_url,
        "Configuration loaded"
    );

    cli::run(cli, config).await
}
