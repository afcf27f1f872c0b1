//! Single-file CLI commands.

use clap::Args;

use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_core::types::RecordId;

use crate::output::{self, OutputFormat};

/// Arguments for `delete-file`
#[derive(Debug, Args)]
pub struct DeleteFileArgs {
    /// Owner ID
    #[arg(short, long)]
    pub owner: String,
    /// File record ID
    pub file_id: String,
}

/// Arguments for `rename-file`
#[derive(Debug, Args)]
pub struct RenameFileArgs {
    /// Owner ID
    #[arg(short, long)]
    pub owner: String,
    /// File record ID
    pub file_id: String,
    /// New file name
    pub name: String,
}

fn parse_file_id(raw: &str) -> Result<RecordId, AppError> {
    raw.trim()
        .parse()
        .map_err(|e| AppError::validation(format!("Invalid file id '{raw}': {e}")))
}

/// Execute `delete-file`
///
/// The process waits for the deferred record and ledger cleanup before
/// exiting; otherwise it would be lost with the runtime.
pub async fn delete_file(
    args: &DeleteFileArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let owner = super::parse_owner(&args.owner)?;
    let file_id = parse_file_id(&args.file_id)?;
    let manager = super::build_manager(config).await?;

    let report = manager.delete_file(&owner, &file_id).await?;
    output::print_report(&report, format);

    tracing::debug!(pending = manager.deferred().pending(), "Waiting for deferred cleanup");
    manager.deferred().drain().await;
    Ok(())
}

/// Execute `rename-file`
pub async fn rename_file(
    args: &RenameFileArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let owner = super::parse_owner(&args.owner)?;
    let file_id = parse_file_id(&args.file_id)?;
    let manager = super::build_manager(config).await?;

    let report = manager.rename_file(&owner, &file_id, &args.name).await?;
    output::print_report(&report, format);
    Ok(())
}
