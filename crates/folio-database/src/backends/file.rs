//! JSON-file record backend.
//!
//! Each table is a single JSON object (`id -> item`) stored at
//! `<data_dir>/<table>.json`. Every call reads the file, applies the
//! operation and, for mutations, rewrites it through a temporary file and
//! a rename. Calls are serialized by one process-wide lock; there is no
//! cross-process locking.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use folio_core::error::{AppError, ErrorKind};
use folio_core::result::AppResult;
use folio_core::traits::record::{RecordBackend, RecordOperation, RecordRequest, RecordResponse};

use super::{TableData, apply_operation};

/// Record backend persisting tables as JSON files.
#[derive(Debug)]
pub struct JsonFileRecordBackend {
    data_dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileRecordBackend {
    /// Create a backend rooted at `data_dir`, creating the directory.
    pub async fn new(data_dir: &str) -> AppResult<Self> {
        let data_dir = PathBuf::from(data_dir);
        fs::create_dir_all(&data_dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to create record directory: {}", data_dir.display()),
                e,
            )
        })?;
        Ok(Self {
            data_dir,
            lock: Mutex::new(()),
        })
    }

    fn table_path(&self, table: &str) -> AppResult<PathBuf> {
        if table.is_empty()
            || !table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AppError::validation(format!("Invalid table name: {table}")));
        }
        Ok(self.data_dir.join(format!("{table}.json")))
    }

    async fn load(path: &Path) -> AppResult<TableData> {
        match fs::read(path).await {
            Ok(raw) => serde_json::from_slice(&raw).map_err(AppError::from),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TableData::new()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Database,
                format!("Failed to read table file: {}", path.display()),
                e,
            )),
        }
    }

    async fn store(path: &Path, table: &TableData) -> AppResult<()> {
        let raw = serde_json::to_vec_pretty(table)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &raw).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to write table file", e)
        })?;
        fs::rename(&tmp, path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to replace table file", e)
        })?;
        Ok(())
    }
}

#[async_trait]
impl RecordBackend for JsonFileRecordBackend {
    fn backend_type(&self) -> &str {
        "file"
    }

    async fn execute(&self, request: RecordRequest) -> AppResult<RecordResponse> {
        let path = self.table_path(&request.table_name)?;
        let mutates = !matches!(
            request.operation,
            RecordOperation::Get { .. } | RecordOperation::Scan { .. }
        );

        let _guard = self.lock.lock().await;
        let mut table = Self::load(&path).await?;
        let response = apply_operation(&mut table, request.operation);
        if mutates {
            Self::store(&path, &table).await?;
            debug!(table = %request.table_name, items = table.len(), "Persisted record table");
        }
        Ok(response)
    }
}
