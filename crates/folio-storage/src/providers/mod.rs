//! Blob store provider implementations.

pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use tracing::info;

use folio_core::config::storage::{BlobProviderKind, StorageConfig};
use folio_core::result::AppResult;
use folio_core::traits::blob::BlobStore;

pub use local::LocalBlobStore;
pub use memory::{BlobOperation, MemoryBlobStore};
#[cfg(feature = "s3")]
pub use s3::S3BlobStore;

/// Build the blob store selected by configuration.
pub async fn create_blob_store(config: &StorageConfig) -> AppResult<Arc<dyn BlobStore>> {
    info!(provider = ?config.provider, "Initializing blob store");
    match config.provider {
        BlobProviderKind::Memory => Ok(Arc::new(MemoryBlobStore::new(config.list_page_size))),
        BlobProviderKind::Local => Ok(Arc::new(
            LocalBlobStore::new(&config.local.root_path, config.list_page_size).await?,
        )),
        #[cfg(feature = "s3")]
        BlobProviderKind::S3 => Ok(Arc::new(
            S3BlobStore::new(&config.s3, config.list_page_size).await?,
        )),
        #[cfg(not(feature = "s3"))]
        BlobProviderKind::S3 => Err(folio_core::error::AppError::configuration(
            "S3 blob store requested but the `s3` feature is not enabled",
        )),
    }
}
