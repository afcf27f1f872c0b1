//! Uniform record store contract shared by the catalog, the ledger and the
//! statement-upload table.
//!
//! Every call is a single `execute` carrying `{operation, tableName,
//! payload}`. The contract has no filter pushdown: `Scan` returns an
//! unordered, capped set of items and callers filter in memory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::result::AppResult;

/// Operation carried by a [`RecordRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "payload", rename_all = "snake_case")]
pub enum RecordOperation {
    /// Fetch one item by id.
    Get {
        /// Item id.
        id: String,
    },
    /// Fetch up to `page_size` items.
    Scan {
        /// Maximum number of items to return.
        page_size: usize,
        /// Whether the backend should follow its own internal pages until
        /// the cap is reached.
        paginate: bool,
    },
    /// Insert or replace an item.
    Put {
        /// Item id.
        id: String,
        /// Full item document.
        item: Value,
    },
    /// Merge `fields` into an existing item.
    Update {
        /// Item id.
        id: String,
        /// Fields to overwrite.
        fields: Map<String, Value>,
    },
    /// Remove an item.
    Delete {
        /// Item id.
        id: String,
    },
}

impl RecordOperation {
    /// Short operation name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Get { .. } => "get",
            Self::Scan { .. } => "scan",
            Self::Put { .. } => "put",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Envelope sent to a [`RecordBackend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    /// Logical table the operation targets.
    pub table_name: String,
    /// The operation and its payload.
    #[serde(flatten)]
    pub operation: RecordOperation,
}

impl RecordRequest {
    /// Build a request for `table`.
    pub fn new(table: impl Into<String>, operation: RecordOperation) -> Self {
        Self {
            table_name: table.into(),
            operation,
        }
    }
}

/// Backend reply to a [`RecordRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum RecordResponse {
    /// Reply to `Get`; `None` when the id is absent.
    Item(Option<Value>),
    /// Reply to `Scan`.
    Items {
        /// Items up to the requested page size.
        items: Vec<Value>,
        /// Whether the table held more items than were returned.
        truncated: bool,
    },
    /// Reply to `Put`, `Update` and `Delete`.
    Ack {
        /// Whether an existing item was affected.
        affected: bool,
    },
}

impl RecordResponse {
    /// Unwrap a `Get` reply.
    pub fn into_item(self) -> AppResult<Option<Value>> {
        match self {
            Self::Item(item) => Ok(item),
            other => Err(unexpected("item", &other)),
        }
    }

    /// Unwrap a `Scan` reply.
    pub fn into_items(self) -> AppResult<(Vec<Value>, bool)> {
        match self {
            Self::Items { items, truncated } => Ok((items, truncated)),
            other => Err(unexpected("items", &other)),
        }
    }

    /// Unwrap a mutation reply.
    pub fn into_ack(self) -> AppResult<bool> {
        match self {
            Self::Ack { affected } => Ok(affected),
            other => Err(unexpected("ack", &other)),
        }
    }
}

fn unexpected(expected: &str, got: &RecordResponse) -> AppError {
    AppError::database(format!(
        "Record backend returned an unexpected response (expected {expected}, got {got:?})"
    ))
}

/// A record store reachable through one generic `execute` call.
#[async_trait]
pub trait RecordBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., "memory", "remote").
    fn backend_type(&self) -> &str;

    /// Run one operation against one table.
    async fn execute(&self, request: RecordRequest) -> AppResult<RecordResponse>;
}
