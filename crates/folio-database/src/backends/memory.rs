//! In-memory record backend.
//!
//! Tables live in a [`DashMap`] keyed by table name. Tests can mark a whole
//! table unreachable or make individual operations fail to exercise the
//! lifecycle manager's per-step failure policies.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use serde_json::Value;
use tracing::trace;

use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::traits::record::{RecordBackend, RecordOperation, RecordRequest, RecordResponse};

use super::{TableData, apply_operation};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FailureRule {
    table: String,
    operation: &'static str,
    id_fragment: String,
}

/// In-memory record backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordBackend {
    tables: Arc<DashMap<String, TableData>>,
    unreachable: Arc<DashSet<String>>,
    failures: Arc<DashSet<FailureRule>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryRecordBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call against `table` fail as if the store were down.
    pub fn set_unreachable(&self, table: &str, unreachable: bool) {
        if unreachable {
            self.unreachable.insert(table.to_string());
        } else {
            self.unreachable.remove(table);
        }
    }

    /// Make `operation` (e.g. `"update"`, `"delete"`) on `table` fail for
    /// ids containing `id_fragment`.
    pub fn fail_when(&self, table: &str, operation: &'static str, id_fragment: impl Into<String>) {
        self.failures.insert(FailureRule {
            table: table.to_string(),
            operation,
            id_fragment: id_fragment.into(),
        });
    }

    /// Remove every injected failure and unreachable mark.
    pub fn clear_failures(&self) {
        self.failures.clear();
        self.unreachable.clear();
    }

    /// Number of `execute` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of items currently stored in `table`.
    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map(|t| t.len()).unwrap_or(0)
    }

    /// Whether `table` holds no items.
    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    fn check_failures(&self, request: &RecordRequest) -> AppResult<()> {
        if self.unreachable.contains(&request.table_name) {
            return Err(AppError::service_unavailable(format!(
                "Record table {} is unreachable",
                request.table_name
            )));
        }

        let id = match &request.operation {
            RecordOperation::Get { id }
            | RecordOperation::Put { id, .. }
            | RecordOperation::Update { id, .. }
            | RecordOperation::Delete { id } => id.as_str(),
            RecordOperation::Scan { .. } => "",
        };
        let op = request.operation.name();
        let failing = self.failures.iter().any(|rule| {
            rule.table == request.table_name && rule.operation == op && id.contains(&rule.id_fragment)
        });
        if failing {
            return Err(AppError::database(format!(
                "Injected {op} failure on {} for id {id}",
                request.table_name
            )));
        }
        Ok(())
    }

    /// Insert a raw document, bypassing typed adapters.
    pub fn insert_raw(&self, table: &str, id: &str, item: Value) {
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(id.to_string(), item);
    }
}

#[async_trait]
impl RecordBackend for MemoryRecordBackend {
    fn backend_type(&self) -> &str {
        "memory"
    }

    async fn execute(&self, request: RecordRequest) -> AppResult<RecordResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_failures(&request)?;
        trace!(table = %request.table_name, operation = request.operation.name(), "Executing record operation");

        let mut table = self.tables.entry(request.table_name).or_default();
        Ok(apply_operation(&mut table, request.operation))
    }
}
