//! Entity lifecycle CLI commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_entity::Entity;

use crate::output::{self, OutputFormat};

/// Arguments for `create`
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Owner ID
    #[arg(short, long)]
    pub owner: String,
    /// Entity name
    pub name: String,
}

/// Arguments for `list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Owner ID
    #[arg(short, long)]
    pub owner: String,
}

/// Arguments for `rename`
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Owner ID
    #[arg(short, long)]
    pub owner: String,
    /// Current entity name
    pub from: String,
    /// New entity name
    pub to: String,
}

/// Arguments for `delete`
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Owner ID
    #[arg(short, long)]
    pub owner: String,
    /// Entity name
    pub name: String,
}

/// Entity display row
#[derive(Debug, Serialize, Tabled)]
struct EntityRow {
    /// Folder record ID
    id: String,
    /// Name
    name: String,
    /// Logical path
    path: String,
    /// Blob key prefix
    prefix: String,
}

impl From<&Entity> for EntityRow {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id.to_string(),
            name: entity.name.clone(),
            path: entity.path.clone(),
            prefix: entity.prefix.clone(),
        }
    }
}

/// Entity name row
#[derive(Debug, Serialize, Tabled)]
struct NameRow {
    /// Entity name
    name: String,
}

/// Execute `create`
pub async fn create(args: &CreateArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let owner = super::parse_owner(&args.owner)?;
    let manager = super::build_manager(config).await?;

    let (entity, report) = manager.create(&owner, &args.name).await?;
    output::print_list(&[EntityRow::from(&entity)], format);
    if format == OutputFormat::Table && !report.is_clean() {
        output::print_report(&report, format);
    }
    Ok(())
}

/// Execute `list`
pub async fn list(args: &ListArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let owner = super::parse_owner(&args.owner)?;
    let manager = super::build_manager(config).await?;

    let rows: Vec<NameRow> = manager
        .list(&owner)
        .await?
        .into_iter()
        .map(|name| NameRow { name })
        .collect();
    output::print_list(&rows, format);
    Ok(())
}

/// Execute `rename`
pub async fn rename(args: &RenameArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let owner = super::parse_owner(&args.owner)?;
    let manager = super::build_manager(config).await?;

    let report = manager.rename(&owner, &args.from, &args.to).await?;
    output::print_report(&report, format);
    Ok(())
}

/// Execute `delete`
pub async fn delete(args: &DeleteArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let owner = super::parse_owner(&args.owner)?;
    let manager = super::build_manager(config).await?;

    let report = manager.delete(&owner, &args.name).await?;
    output::print_report(&report, format);
    Ok(())
}
