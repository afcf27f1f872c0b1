//! Record backend implementations.

pub mod file;
pub mod memory;
#[cfg(feature = "remote")]
pub mod remote;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use folio_core::config::records::{RecordBackendKind, RecordsConfig};
use folio_core::result::AppResult;
use folio_core::traits::record::{RecordBackend, RecordOperation, RecordResponse};

pub use file::JsonFileRecordBackend;
pub use memory::MemoryRecordBackend;
#[cfg(feature = "remote")]
pub use remote::RemoteRecordBackend;

/// Items of one table, keyed by id.
pub(crate) type TableData = BTreeMap<String, Value>;

/// Build the record backend selected by configuration.
pub async fn create_record_backend(config: &RecordsConfig) -> AppResult<Arc<dyn RecordBackend>> {
    info!(backend = ?config.backend, max_scan_items = config.max_scan_items, "Initializing record backend");
    match config.backend {
        RecordBackendKind::Memory => Ok(Arc::new(MemoryRecordBackend::new())),
        RecordBackendKind::File => Ok(Arc::new(
            JsonFileRecordBackend::new(&config.data_dir).await?,
        )),
        #[cfg(feature = "remote")]
        RecordBackendKind::Remote => Ok(Arc::new(RemoteRecordBackend::new(&config.remote)?)),
        #[cfg(not(feature = "remote"))]
        RecordBackendKind::Remote => Err(folio_core::error::AppError::configuration(
            "Remote record backend requested but the `remote` feature is not enabled",
        )),
    }
}

/// Apply one operation to an in-process table.
///
/// Shared by the memory and file backends so both honour the same
/// semantics: `Put` upserts, `Update` merges fields into an existing object
/// and reports `affected: false` for unknown ids, `Scan` returns at most
/// `page_size` items.
pub(crate) fn apply_operation(table: &mut TableData, operation: RecordOperation) -> RecordResponse {
    match operation {
        RecordOperation::Get { id } => RecordResponse::Item(table.get(&id).cloned()),
        RecordOperation::Scan { page_size, .. } => {
            let items: Vec<Value> = table.values().take(page_size).cloned().collect();
            RecordResponse::Items {
                truncated: table.len() > items.len(),
                items,
            }
        }
        RecordOperation::Put { id, item } => {
            let replaced = table.insert(id, item).is_some();
            RecordResponse::Ack { affected: replaced }
        }
        RecordOperation::Update { id, fields } => match table.get_mut(&id) {
            Some(Value::Object(existing)) => {
                existing.extend(fields);
                RecordResponse::Ack { affected: true }
            }
            _ => RecordResponse::Ack { affected: false },
        },
        RecordOperation::Delete { id } => RecordResponse::Ack {
            affected: table.remove(&id).is_some(),
        },
    }
}
