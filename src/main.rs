//! Folio CLI entry point.
//!
//! Loads configuration, initializes logging and runs one lifecycle command
//! against the configured blob store and record backend.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use folio_core::config::AppConfig;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match commands::load_config(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            output::print_error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::debug!(config = %cli.config, "Configuration loaded");

    if let Err(e) = cli.execute(config).await {
        tracing::error!(error = %e, "Command failed");
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
///
/// `RUST_LOG` wins over `logging.level`. Logs go to stderr so command
/// output on stdout stays machine-readable.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
