//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Which blob store implementation backs the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobProviderKind {
    /// Process-local map; contents vanish on exit.
    Memory,
    /// Directory tree on the local filesystem.
    Local,
    /// S3-compatible object store (requires the `s3` feature).
    S3,
}

/// Top-level blob storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Blob store implementation to use.
    #[serde(default = "default_provider")]
    pub provider: BlobProviderKind,
    /// Maximum number of keys returned by one prefix listing call.
    #[serde(default = "default_list_page_size")]
    pub list_page_size: usize,
    /// Base URL used when building public blob URLs for statement uploads.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Local filesystem storage configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
    /// S3-compatible storage configuration.
    #[serde(default)]
    pub s3: S3StorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            list_page_size: default_list_page_size(),
            public_base_url: default_public_base_url(),
            local: LocalStorageConfig::default(),
            s3: S3StorageConfig::default(),
        }
    }
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root path for local blob storage.
    #[serde(default = "default_local_root")]
    pub root_path: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3StorageConfig {
    /// S3 endpoint URL (for non-AWS services like MinIO). Empty means AWS.
    #[serde(default)]
    pub endpoint: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// S3 bucket name.
    #[serde(default)]
    pub bucket: String,
    /// Access key ID.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: default_region(),
            bucket: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
        }
    }
}

fn default_provider() -> BlobProviderKind {
    BlobProviderKind::Memory
}

fn default_list_page_size() -> usize {
    1000
}

fn default_public_base_url() -> String {
    "http://localhost:9000/folio".to_string()
}

fn default_local_root() -> String {
    "./data/blobs".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}
