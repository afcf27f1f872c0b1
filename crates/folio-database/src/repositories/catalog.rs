//! Metadata catalog of folder and file records.

use std::sync::Arc;

use folio_core::config::records::RecordsConfig;
use folio_core::result::AppResult;
use folio_core::traits::record::RecordBackend;
use folio_core::types::{OwnerId, RecordId};
use folio_entity::drive::model::{DriveRecord, DriveRecordPatch};

use crate::table::{Record, RecordTable};

impl Record for DriveRecord {
    const TABLE: &'static str = "drive_records";

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

/// Repository over the `drive_records` table.
#[derive(Debug, Clone)]
pub struct MetadataCatalog {
    table: RecordTable<DriveRecord>,
}

impl MetadataCatalog {
    /// Create a catalog over `backend`.
    pub fn new(backend: Arc<dyn RecordBackend>, config: &RecordsConfig) -> Self {
        Self {
            table: RecordTable::new(backend, config.max_scan_items),
        }
    }

    /// Find a record by ID.
    pub async fn find_by_id(&self, id: &RecordId) -> AppResult<Option<DriveRecord>> {
        self.table.find_by_id(&id.to_string()).await
    }

    /// Get a record by ID, failing with `NotFound`.
    pub async fn get_by_id(&self, id: &RecordId) -> AppResult<DriveRecord> {
        self.table.get_by_id(&id.to_string()).await
    }

    /// Every record visible within the scan cap.
    pub async fn scan_all(&self) -> AppResult<Vec<DriveRecord>> {
        self.table.scan_all().await
    }

    /// Insert or replace a record.
    pub async fn create(&self, record: &DriveRecord) -> AppResult<()> {
        self.table.create(record).await
    }

    /// Apply a partial update.
    pub async fn update(&self, id: &RecordId, patch: DriveRecordPatch) -> AppResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.table.update(&id.to_string(), patch.into_fields()).await
    }

    /// Delete a record. Returns `true` if it existed.
    pub async fn delete(&self, id: &RecordId) -> AppResult<bool> {
        self.table.delete(&id.to_string()).await
    }

    /// Folder records owned by `owner`.
    pub async fn owned_folders(&self, owner: &OwnerId) -> AppResult<Vec<DriveRecord>> {
        self.table
            .scan_filter(|r| &r.owner_id == owner && r.is_folder())
            .await
    }

    /// Records owned by `owner` whose blob key starts with `prefix`.
    pub async fn under_prefix(&self, owner: &OwnerId, prefix: &str) -> AppResult<Vec<DriveRecord>> {
        self.table
            .scan_filter(|r| &r.owner_id == owner && r.is_under(prefix))
            .await
    }

    /// Records owned by `owner` that belong to an entity: blob key under
    /// `prefix` or logical path equal to `path`.
    pub async fn in_entity(
        &self,
        owner: &OwnerId,
        prefix: &str,
        path: &str,
    ) -> AppResult<Vec<DriveRecord>> {
        self.table
            .scan_filter(|r| &r.owner_id == owner && (r.is_under(prefix) || r.path == path))
            .await
    }

    /// Locate a file record owned by `owner` through a full scan.
    pub async fn find_file(&self, owner: &OwnerId, id: &RecordId) -> AppResult<Option<DriveRecord>> {
        Ok(self
            .table
            .scan_all()
            .await?
            .into_iter()
            .find(|r| &r.id == id && &r.owner_id == owner && r.is_file()))
    }
}
