//! Statement upload cross-references.

use std::sync::Arc;

use serde_json::{Map, Value};

use folio_core::config::records::RecordsConfig;
use folio_core::result::AppResult;
use folio_core::traits::record::RecordBackend;
use folio_core::types::UploadId;
use folio_entity::upload::model::StatementUpload;

use crate::table::{Record, RecordTable};

impl Record for StatementUpload {
    const TABLE: &'static str = "statement_uploads";

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

/// Repository over the `statement_uploads` table.
#[derive(Debug, Clone)]
pub struct StatementUploadRepository {
    table: RecordTable<StatementUpload>,
}

impl StatementUploadRepository {
    /// Create a repository over `backend`.
    pub fn new(backend: Arc<dyn RecordBackend>, config: &RecordsConfig) -> Self {
        Self {
            table: RecordTable::new(backend, config.max_scan_items),
        }
    }

    /// Insert an upload reference.
    pub async fn create(&self, upload: &StatementUpload) -> AppResult<()> {
        self.table.create(upload).await
    }

    /// Get an upload by ID.
    pub async fn get_by_id(&self, id: &UploadId) -> AppResult<StatementUpload> {
        self.table.get_by_id(&id.to_string()).await
    }

    /// Uploads whose URL contains `fragment`.
    pub async fn referencing(&self, fragment: &str) -> AppResult<Vec<StatementUpload>> {
        self.table
            .scan_filter(|upload| upload.blob_url.contains(fragment))
            .await
    }

    /// Replace the stored URL of an upload.
    pub async fn update_url(&self, id: &UploadId, blob_url: &str) -> AppResult<()> {
        let mut fields = Map::new();
        fields.insert("blob_url".to_string(), Value::String(blob_url.to_string()));
        self.table.update(&id.to_string(), fields).await
    }
}
