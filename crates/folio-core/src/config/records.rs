//! Record store configuration.

use serde::{Deserialize, Serialize};

/// Which record backend serves the catalog, ledger and upload tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordBackendKind {
    /// Process-local tables.
    Memory,
    /// One JSON document per table under `data_dir`.
    File,
    /// Remote `execute` endpoint (requires the `remote` feature).
    Remote,
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// Backend implementation to use.
    #[serde(default = "default_backend")]
    pub backend: RecordBackendKind,
    /// Upper bound on the number of items a full scan returns.
    ///
    /// Items beyond this cap are invisible to every lifecycle operation.
    #[serde(default = "default_max_scan_items")]
    pub max_scan_items: usize,
    /// Directory for the `file` backend.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Settings for the `remote` backend.
    #[serde(default)]
    pub remote: RemoteRecordsConfig,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            max_scan_items: default_max_scan_items(),
            data_dir: default_data_dir(),
            remote: RemoteRecordsConfig::default(),
        }
    }
}

/// Remote record backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRecordsConfig {
    /// Base address of the backend; requests go to `<base_url>/execute`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for RemoteRecordsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_backend() -> RecordBackendKind {
    RecordBackendKind::Memory
}

fn default_max_scan_items() -> usize {
    1000
}

fn default_data_dir() -> String {
    "./data/records".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    30
}
