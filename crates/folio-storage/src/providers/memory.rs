//! In-memory blob store.
//!
//! Keys are held in an ordered map so prefix listings page in key order,
//! with the last key of a page doubling as the continuation token. Failure
//! rules can be installed to simulate an unreliable backend.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::traits::blob::BlobStore;
use folio_core::types::scan::ListPage;

/// Blob store call kinds, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobOperation {
    /// `put`
    Put,
    /// `get` and `exists`
    Read,
    /// `list_page`
    List,
    /// `copy`
    Copy,
    /// `delete`
    Delete,
}

#[derive(Debug, Clone)]
struct FailureRule {
    operation: BlobOperation,
    key_fragment: String,
}

/// In-memory blob store.
#[derive(Debug, Clone)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<BTreeMap<String, Bytes>>>,
    page_size: usize,
    failures: Arc<RwLock<Vec<FailureRule>>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryBlobStore {
    /// Create an empty store returning at most `page_size` keys per listing.
    pub fn new(page_size: usize) -> Self {
        Self {
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            page_size: page_size.max(1),
            failures: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every `operation` whose key contains `key_fragment` fail.
    ///
    /// For copies the fragment is matched against the source key; for
    /// listings, against the prefix.
    pub async fn fail_when(&self, operation: BlobOperation, key_fragment: impl Into<String>) {
        self.failures.write().await.push(FailureRule {
            operation,
            key_fragment: key_fragment.into(),
        });
    }

    /// Remove every injected failure.
    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Number of calls made against the store so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored key, in order.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    async fn enter(&self, operation: BlobOperation, key: &str) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failures = self.failures.read().await;
        if failures
            .iter()
            .any(|rule| rule.operation == operation && key.contains(&rule.key_fragment))
        {
            return Err(AppError::storage(format!(
                "Injected {operation:?} failure for key: {key}"
            )));
        }
        Ok(())
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        self.enter(BlobOperation::Put, key).await?;
        self.objects.write().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Bytes> {
        self.enter(BlobOperation::Read, key).await?;
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {key}")))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.enter(BlobOperation::Read, key).await?;
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> AppResult<ListPage> {
        self.enter(BlobOperation::List, prefix).await?;
        let objects = self.objects.read().await;

        let start = match continuation_token {
            Some(token) => Bound::Excluded(token.to_string()),
            None => Bound::Included(prefix.to_string()),
        };
        let mut matching = objects
            .range::<String, _>((start, Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix));

        let keys: Vec<String> = matching.by_ref().take(self.page_size).cloned().collect();
        let next_token = if matching.next().is_some() {
            keys.last().cloned()
        } else {
            None
        };

        Ok(ListPage { keys, next_token })
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        self.enter(BlobOperation::Copy, from).await?;
        let mut objects = self.objects.write().await;
        let data = objects
            .get(from)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {from}")))?;
        objects.insert(to.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.enter(BlobOperation::Delete, key).await?;
        self.objects.write().await.remove(key);
        Ok(())
    }
}
