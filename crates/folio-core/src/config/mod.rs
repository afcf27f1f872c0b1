//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. The loaded [`AppConfig`] is passed explicitly into the store
//! adapters and the lifecycle manager; nothing reads the environment at
//! call time.

pub mod lifecycle;
pub mod logging;
pub mod records;
pub mod storage;

use serde::{Deserialize, Serialize};

use self::lifecycle::LifecycleConfig;
use self::logging::LoggingConfig;
use self::records::RecordsConfig;
use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// configuration sources (default.toml + optional file + environment).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Record store (catalog, ledger, uploads) settings.
    #[serde(default)]
    pub records: RecordsConfig,
    /// Entity lifecycle settings.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges `config/default.toml` (if present), the file at `path` (if
    /// present) and environment variables prefixed with `FOLIO__`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
