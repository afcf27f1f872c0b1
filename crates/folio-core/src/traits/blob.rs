//! Blob store trait for pluggable object storage backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;
use crate::types::scan::ListPage;

/// Key-addressed object storage.
///
/// Implementations exist for memory, the local filesystem and S3. There
/// is deliberately no move primitive: moving an object is a `copy`
/// followed by a `delete`, two independent calls.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write bytes under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: Bytes) -> AppResult<()>;

    /// Read the object under `key`. Missing objects yield `NotFound`.
    async fn get(&self, key: &str) -> AppResult<Bytes>;

    /// Check whether an object exists under `key`.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Fetch one page of keys starting with `prefix`.
    ///
    /// Pass the previous page's `next_token` to continue; `None` starts
    /// from the beginning.
    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> AppResult<ListPage>;

    /// Copy the object under `from` to `to`.
    async fn copy(&self, from: &str, to: &str) -> AppResult<()>;

    /// Delete the object under `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;
}
