//! CLI command definitions and dispatch.

pub mod config;
pub mod entity;
pub mod file;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_core::types::OwnerId;
use folio_database::{
    MetadataCatalog, StatementUploadRepository, TransactionLedger, create_record_backend,
};
use folio_service::EntityLifecycleManager;
use folio_storage::{BlobStorage, create_blob_store};

use crate::output::OutputFormat;

/// Folio: group uploaded statements into entities and keep the blob store,
/// catalog and ledger in step while renaming or deleting them
#[derive(Debug, Parser)]
#[command(name = "folio", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an entity
    Create(entity::CreateArgs),
    /// List an owner's entities
    List(entity::ListArgs),
    /// Rename an entity and everything filed under it
    Rename(entity::RenameArgs),
    /// Delete an entity from every store
    Delete(entity::DeleteArgs),
    /// Delete a single file
    DeleteFile(file::DeleteFileArgs),
    /// Rename a single file
    RenameFile(file::RenameFileArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, app_config: AppConfig) -> Result<(), AppError> {
        let cfg = &app_config;
        match &self.command {
            Commands::Config(args) => config::execute(args, &self.config, cfg, self.format).await,
            Commands::Create(args) => entity::create(args, cfg, self.format).await,
            Commands::List(args) => entity::list(args, cfg, self.format).await,
            Commands::Rename(args) => entity::rename(args, cfg, self.format).await,
            Commands::Delete(args) => entity::delete(args, cfg, self.format).await,
            Commands::DeleteFile(args) => file::delete_file(args, cfg, self.format).await,
            Commands::RenameFile(args) => file::rename_file(args, cfg, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: build the lifecycle manager over the configured stores
pub async fn build_manager(config: &AppConfig) -> Result<EntityLifecycleManager, AppError> {
    let blob_store = create_blob_store(&config.storage).await?;
    let records = create_record_backend(&config.records).await?;

    Ok(EntityLifecycleManager::new(
        BlobStorage::new(blob_store, &config.storage),
        MetadataCatalog::new(Arc::clone(&records), &config.records),
        TransactionLedger::new(Arc::clone(&records), &config.records),
        StatementUploadRepository::new(records, &config.records),
        &config.lifecycle,
    ))
}

/// Helper: parse an owner id argument
pub fn parse_owner(raw: &str) -> Result<OwnerId, AppError> {
    OwnerId::parse(raw)
}
