//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_storage::{BlobStorage, create_blob_store};

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration and summarize the selected stores
    Validate,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.storage.s3.access_key = mask_secret(&shown.storage.s3.access_key);
            shown.storage.s3.secret_key = mask_secret(&shown.storage.s3.secret_key);
            output::print_item(&shown, format);
        }
        ConfigCommand::Validate => {
            output::print_success(&format!("Configuration '{config_path}' is valid"));
            println!("  Blob store:     {:?}", config.storage.provider);
            println!("  Record backend: {:?}", config.records.backend);
            println!("  Scan cap:       {}", config.records.max_scan_items);
            println!("  Key namespace:  {}", config.lifecycle.key_namespace);

            let store = create_blob_store(&config.storage).await?;
            let provider = store.provider_type().to_string();
            let storage = BlobStorage::new(store, &config.storage);
            if storage.health_check().await? {
                output::print_success(&format!("Blob store '{provider}' is reachable"));
            } else {
                output::print_warning(&format!("Blob store '{provider}' failed its health check"));
            }
        }
    }

    Ok(())
}

/// Mask a credential for display
fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        "****".to_string()
    }
}
