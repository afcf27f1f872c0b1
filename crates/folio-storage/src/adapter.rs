//! Blob storage adapter used by the lifecycle manager.

use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tracing::debug;

use folio_core::config::storage::StorageConfig;
use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::traits::blob::BlobStore;

/// Where a prefix listing stands between pages.
enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Wraps a [`BlobStore`] with prefix streaming, copy-then-delete moves and
/// public URL construction.
#[derive(Debug, Clone)]
pub struct BlobStorage {
    store: Arc<dyn BlobStore>,
    public_base_url: String,
}

impl BlobStorage {
    /// Create an adapter over `store`.
    pub fn new(store: Arc<dyn BlobStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// Whether the underlying store is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.store.health_check().await
    }

    /// Write `data` under `key`.
    pub async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        self.store.put(key, data).await
    }

    /// Read the object under `key`.
    pub async fn get(&self, key: &str) -> AppResult<Bytes> {
        self.store.get(key).await
    }

    /// Check whether `key` exists.
    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        self.store.exists(key).await
    }

    /// Copy `from` to `to`.
    pub async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        self.store.copy(from, to).await
    }

    /// Delete `key`.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        self.store.delete(key).await
    }

    /// Lazily stream every key under `prefix`.
    ///
    /// Pages are fetched one at a time as the stream is polled, following
    /// continuation tokens until the store reports no more. Calling this
    /// again starts over from the first page. A listing error ends the
    /// stream with that error.
    pub fn list_by_prefix(&self, prefix: &str) -> BoxStream<'static, AppResult<String>> {
        let store = Arc::clone(&self.store);
        let prefix = prefix.to_string();

        stream::try_unfold(Cursor::Start, move |cursor| {
            let store = Arc::clone(&store);
            let prefix = prefix.clone();
            async move {
                let token = match cursor {
                    Cursor::Done => return Ok(None),
                    Cursor::Start => None,
                    Cursor::Next(token) => Some(token),
                };
                let page = store.list_page(&prefix, token.as_deref()).await?;
                debug!(
                    prefix = %prefix,
                    keys = page.keys.len(),
                    truncated = page.is_truncated(),
                    "Fetched blob listing page"
                );
                let next = match page.next_token {
                    Some(token) => Cursor::Next(token),
                    None => Cursor::Done,
                };
                let keys = stream::iter(page.keys.into_iter().map(Ok::<_, AppError>));
                Ok::<_, AppError>(Some((keys, next)))
            }
        })
        .try_flatten()
        .boxed()
    }

    /// Move an object: copy to `to`, then delete `from`.
    ///
    /// The two calls are independent. If the delete fails the object exists
    /// under both keys and the new key is authoritative.
    pub async fn move_object(&self, from: &str, to: &str) -> AppResult<()> {
        self.store.copy(from, to).await?;
        self.store.delete(from).await?;
        debug!(from, to, "Moved blob");
        Ok(())
    }

    /// Public URL for `key`.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::memory::{BlobOperation, MemoryBlobStore};

    fn storage(store: MemoryBlobStore) -> BlobStorage {
        BlobStorage::new(Arc::new(store), &StorageConfig::default())
    }

    #[tokio::test]
    async fn test_health_check_delegates_to_store() {
        assert!(storage(MemoryBlobStore::new(2)).health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_list_by_prefix_follows_tokens() {
        let store = MemoryBlobStore::new(2);
        for i in 0..5 {
            store
                .put(&format!("p/{i}.csv"), Bytes::new())
                .await
                .unwrap();
        }
        store.put("q/other.csv", Bytes::new()).await.unwrap();
        let storage = storage(store);

        let keys: Vec<String> = storage.list_by_prefix("p/").try_collect().await.unwrap();
        assert_eq!(keys, vec!["p/0.csv", "p/1.csv", "p/2.csv", "p/3.csv", "p/4.csv"]);

        // restartable
        let again: Vec<String> = storage.list_by_prefix("p/").try_collect().await.unwrap();
        assert_eq!(again.len(), 5);
    }

    #[tokio::test]
    async fn test_list_by_prefix_is_lazy() {
        let store = MemoryBlobStore::new(1);
        for key in ["p/a", "p/b", "p/c"] {
            store.put(key, Bytes::new()).await.unwrap();
        }
        let before = store.call_count();
        let storage = storage(store.clone());

        let mut keys = storage.list_by_prefix("p/");
        assert_eq!(store.call_count(), before);
        let first = keys.next().await.unwrap().unwrap();
        assert_eq!(first, "p/a");
        assert_eq!(store.call_count(), before + 1);
    }

    #[tokio::test]
    async fn test_list_error_surfaces() {
        let store = MemoryBlobStore::default();
        store.fail_when(BlobOperation::List, "p/").await;
        let storage = storage(store);
        let result: AppResult<Vec<String>> = storage.list_by_prefix("p/").try_collect().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_move_leaves_both_keys_when_delete_fails() {
        let store = MemoryBlobStore::default();
        store.put("old/a.csv", Bytes::from("a")).await.unwrap();
        store.fail_when(BlobOperation::Delete, "old/").await;
        let storage = storage(store.clone());

        assert!(storage.move_object("old/a.csv", "new/a.csv").await.is_err());
        assert!(store.exists("old/a.csv").await.unwrap());
        assert_eq!(store.get("new/a.csv").await.unwrap(), Bytes::from("a"));
    }

    #[test]
    fn test_public_url() {
        let config = StorageConfig {
            public_base_url: "https://cdn.example.com/bucket/".into(),
            ..Default::default()
        };
        let storage = BlobStorage::new(Arc::new(MemoryBlobStore::default()), &config);
        assert_eq!(
            storage.public_url("users/u1/entities/Acme/a.csv"),
            "https://cdn.example.com/bucket/users/u1/entities/Acme/a.csv"
        );
    }
}
