//! Transaction ledger repository.

use std::sync::Arc;

use serde_json::{Map, Value};

use folio_core::config::records::RecordsConfig;
use folio_core::result::AppResult;
use folio_core::traits::record::RecordBackend;
use folio_core::types::{OwnerId, RecordId, TransactionId};
use folio_entity::ledger::model::TransactionRecord;

use crate::table::{Record, RecordTable};

impl Record for TransactionRecord {
    const TABLE: &'static str = "transactions";

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

/// Repository over the `transactions` table.
#[derive(Debug, Clone)]
pub struct TransactionLedger {
    table: RecordTable<TransactionRecord>,
}

impl TransactionLedger {
    /// Create a ledger over `backend`.
    pub fn new(backend: Arc<dyn RecordBackend>, config: &RecordsConfig) -> Self {
        Self {
            table: RecordTable::new(backend, config.max_scan_items),
        }
    }

    /// Every row visible within the scan cap.
    pub async fn scan_all(&self) -> AppResult<Vec<TransactionRecord>> {
        self.table.scan_all().await
    }

    /// Rows filed under `owner`'s entity `name`.
    pub async fn for_entity(&self, owner: &OwnerId, name: &str) -> AppResult<Vec<TransactionRecord>> {
        self.table
            .scan_filter(|row| row.belongs_to_entity(owner, name))
            .await
    }

    /// Rows extracted from `file_id`.
    pub async fn for_file(&self, file_id: &RecordId) -> AppResult<Vec<TransactionRecord>> {
        self.table.scan_filter(|row| &row.file_id == file_id).await
    }

    /// Insert a row.
    pub async fn create(&self, row: &TransactionRecord) -> AppResult<()> {
        self.table.create(row).await
    }

    /// File a row under a different entity name.
    pub async fn relabel(&self, id: &TransactionId, entity_name: &str) -> AppResult<()> {
        let mut fields = Map::new();
        fields.insert(
            "entity_name".to_string(),
            Value::String(entity_name.to_string()),
        );
        self.table.update(&id.to_string(), fields).await
    }

    /// Delete a row. Returns `true` if it existed.
    pub async fn delete(&self, id: &TransactionId) -> AppResult<bool> {
        self.table.delete(&id.to_string()).await
    }
}
