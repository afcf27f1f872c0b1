//! Local filesystem blob store.
//!
//! Keys map to relative paths under the root directory. Listings walk the
//! directory that contains the prefix in key order, resume after the last
//! returned key, and stop reading once a page is full.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use folio_core::error::{AppError, ErrorKind};
use folio_core::result::AppResult;
use folio_core::traits::blob::BlobStore;
use folio_core::types::scan::ListPage;

/// A directory entry seen while walking keys.
struct WalkEntry {
    key: String,
    path: PathBuf,
    is_dir: bool,
}

/// Local filesystem blob store.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Root directory for all stored blobs.
    root: PathBuf,
    /// Maximum keys per listing page.
    page_size: usize,
}

impl LocalBlobStore {
    /// Create a new local blob store rooted at the given path.
    pub async fn new(root_path: &str, page_size: usize) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            page_size: page_size.max(1),
        })
    }

    /// Resolve a key to an absolute path within the root.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let clean = key.trim_start_matches('/');
        if clean.split('/').any(|segment| segment == "..") {
            return Err(AppError::validation(format!("Invalid blob key: {key}")));
        }
        Ok(self.root.join(clean))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Remove empty directories between `path` and the root.
    async fn prune_empty_parents(&self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir == self.root.as_path() || !dir.starts_with(&self.root) {
                break;
            }
            // remove_dir only succeeds on empty directories
            if fs::remove_dir(dir).await.is_err() {
                break;
            }
            current = dir.parent();
        }
    }

    /// Entries of `dir` in descending key order, directories keyed with a
    /// trailing `/` so popping from the end walks keys in ascending order.
    async fn sorted_entries(&self, dir: &Path) -> AppResult<Vec<WalkEntry>> {
        let mut entries = fs::read_dir(dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to list directory: {}", dir.display()),
                e,
            )
        })?;

        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let path = entry.path();
            let is_dir = entry
                .file_type()
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to get entry type", e))?
                .is_dir();
            let Some(mut key) = self.key_of(&path) else {
                continue;
            };
            if is_dir {
                key.push('/');
            }
            found.push(WalkEntry { key, path, is_dir });
        }

        found.sort_by(|a, b| b.key.cmp(&a.key));
        Ok(found)
    }

    /// Walk keys under `prefix` in ascending order, starting after `after`,
    /// and stop once `limit` keys are found.
    ///
    /// Directories that cannot hold a matching key past `after` are not
    /// descended into.
    async fn walk_keys(&self, prefix: &str, after: Option<&str>, limit: usize) -> AppResult<Vec<String>> {
        let dir_part = match prefix.rfind('/') {
            Some(idx) => &prefix[..idx],
            None => "",
        };
        let start = self.resolve(dir_part)?;
        if !start.is_dir() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        let mut stack = self.sorted_entries(&start).await?;
        while let Some(entry) = stack.pop() {
            if entry.is_dir {
                let overlaps = entry.key.starts_with(prefix) || prefix.starts_with(&entry.key);
                let behind = after
                    .is_some_and(|token| entry.key.as_str() < token && !token.starts_with(&entry.key));
                if overlaps && !behind {
                    stack.extend(self.sorted_entries(&entry.path).await?);
                }
            } else if entry.key.starts_with(prefix)
                && after.is_none_or(|token| entry.key.as_str() > token)
            {
                keys.push(entry.key);
                if keys.len() >= limit {
                    break;
                }
            }
        }
        Ok(keys)
    }

    /// Convert an absolute path back into a `/`-separated key.
    fn key_of(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        Some(segments.join("/"))
    }
}

fn io_error(e: std::io::Error, message: String, key: &str) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Blob not found: {key}"))
    } else {
        AppError::with_source(ErrorKind::Storage, message, e)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.exists() && self.root.is_dir())
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(key)?;
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write blob: {key}"),
                e,
            )
        })?;

        debug!(key, bytes = data.len(), "Wrote blob");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(key)?;
        let data = fs::read(&full_path)
            .await
            .map_err(|e| io_error(e, format!("Failed to read blob: {key}"), key))?;
        Ok(Bytes::from(data))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let full_path = self.resolve(key)?;
        Ok(full_path.is_file())
    }

    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> AppResult<ListPage> {
        // One key past the page tells whether another page follows.
        let mut page = self
            .walk_keys(prefix, continuation_token, self.page_size + 1)
            .await?;
        let next_token = if page.len() > self.page_size {
            page.truncate(self.page_size);
            page.last().cloned()
        } else {
            None
        };

        Ok(ListPage {
            keys: page,
            next_token,
        })
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        let from_path = self.resolve(from)?;
        let to_path = self.resolve(to)?;
        self.ensure_parent(&to_path).await?;

        fs::copy(&from_path, &to_path)
            .await
            .map_err(|e| io_error(e, format!("Failed to copy {from} -> {to}"), from))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_path = self.resolve(key)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                self.prune_empty_parents(&full_path).await;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete blob: {key}"),
                e,
            )),
        }
    }
}
