//! Typed adapter over one logical table of a [`RecordBackend`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::traits::record::{RecordBackend, RecordOperation, RecordRequest, RecordResponse};

/// A document stored in a named record table.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Logical table name.
    const TABLE: &'static str;

    /// Primary key as sent on the wire.
    fn record_id(&self) -> String;
}

/// Typed access to one table.
///
/// Lookups by id go straight to the backend. Everything else is a capped
/// full scan: [`RecordTable::scan_all`] asks for at most `max_scan_items`
/// items and everything past that cap is invisible to callers.
pub struct RecordTable<T> {
    backend: Arc<dyn RecordBackend>,
    max_scan_items: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for RecordTable<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            max_scan_items: self.max_scan_items,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for RecordTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordTable")
            .field("backend", &self.backend.backend_type())
            .field("max_scan_items", &self.max_scan_items)
            .finish()
    }
}

impl<T: Record> RecordTable<T> {
    /// Create an adapter over `backend`.
    pub fn new(backend: Arc<dyn RecordBackend>, max_scan_items: usize) -> Self {
        Self {
            backend,
            max_scan_items: max_scan_items.max(1),
            _marker: PhantomData,
        }
    }

    /// Table name.
    pub fn name(&self) -> &'static str {
        T::TABLE
    }

    async fn execute(&self, operation: RecordOperation) -> AppResult<RecordResponse> {
        self.backend
            .execute(RecordRequest::new(T::TABLE, operation))
            .await
    }

    /// Find an item by id.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<T>> {
        let item = self
            .execute(RecordOperation::Get { id: id.to_string() })
            .await?
            .into_item()?;
        item.map(|value| serde_json::from_value(value).map_err(AppError::from))
            .transpose()
    }

    /// Fetch an item by id, failing with `NotFound` when it is absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<T> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} item {id} not found", T::TABLE)))
    }

    /// Fetch every item up to the scan cap.
    ///
    /// Items that fail to decode are skipped with a warning so that one
    /// malformed document cannot break every reader of the table.
    pub async fn scan_all(&self) -> AppResult<Vec<T>> {
        let (values, truncated) = self
            .execute(RecordOperation::Scan {
                page_size: self.max_scan_items,
                paginate: true,
            })
            .await?
            .into_items()?;

        if truncated {
            warn!(
                table = T::TABLE,
                cap = self.max_scan_items,
                "Scan hit the item cap; items beyond it are invisible"
            );
        }

        Ok(values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<T>(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(table = T::TABLE, error = %e, "Skipping undecodable item");
                    None
                }
            })
            .collect())
    }

    /// Scan and keep the items matching `predicate`.
    pub async fn scan_filter(&self, predicate: impl Fn(&T) -> bool) -> AppResult<Vec<T>> {
        Ok(self
            .scan_all()
            .await?
            .into_iter()
            .filter(|item| predicate(item))
            .collect())
    }

    /// Insert or replace an item.
    pub async fn create(&self, item: &T) -> AppResult<()> {
        let value = serde_json::to_value(item)?;
        self.execute(RecordOperation::Put {
            id: item.record_id(),
            item: value,
        })
        .await?
        .into_ack()?;
        Ok(())
    }

    /// Merge `fields` into an existing item. Unknown ids yield `NotFound`.
    pub async fn update(&self, id: &str, fields: Map<String, Value>) -> AppResult<()> {
        let affected = self
            .execute(RecordOperation::Update {
                id: id.to_string(),
                fields,
            })
            .await?
            .into_ack()?;
        if affected {
            Ok(())
        } else {
            Err(AppError::not_found(format!("{} item {id} not found", T::TABLE)))
        }
    }

    /// Delete an item. Returns `true` if it existed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        self.execute(RecordOperation::Delete { id: id.to_string() })
            .await?
            .into_ack()
    }
}
