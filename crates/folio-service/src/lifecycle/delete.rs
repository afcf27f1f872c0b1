//! Cascading entity DELETE.

use futures::TryStreamExt;
use futures::future::join_all;
use tracing::{info, warn};

use folio_core::result::AppResult;
use folio_core::types::OwnerId;

use super::manager::{EntityLifecycleManager, aborted, settle};
use crate::naming::{EntityKeys, normalize_name};
use crate::saga::{SagaReport, StepOutcome, StepPolicy};

const OPERATION: &str = "delete";

impl EntityLifecycleManager {
    /// Delete `owner`'s entity `name` from every store.
    ///
    /// Blobs under the entity prefix go first and any failure there aborts
    /// with the catalog untouched. Catalog records and ledger rows are then
    /// deleted concurrently on a best-effort basis; an unreachable ledger
    /// only skips its step.
    pub async fn delete(&self, owner: &OwnerId, name: &str) -> AppResult<SagaReport> {
        let name = normalize_name(name, "Entity name")?;
        let keys = self.keys(owner, &name);
        let mut report = SagaReport::new(OPERATION);

        report.push(self.delete_blobs(&keys).await?);
        report.push(self.delete_records(owner, &keys).await);
        report.push(self.delete_ledger_rows(owner, &keys).await);

        info!(
            owner_id = %owner,
            entity = %keys.name,
            failed = report.failed(),
            "Entity deleted"
        );
        Ok(report)
    }

    async fn delete_blobs(&self, keys: &EntityKeys) -> AppResult<StepOutcome> {
        let mut step = StepOutcome::new("delete-blobs", StepPolicy::Abort);
        let mut listing = self.blobs.list_by_prefix(&keys.prefix);

        while let Some(key) = listing
            .try_next()
            .await
            .map_err(|e| aborted(OPERATION, step.name, e))?
        {
            let deleted = self.blobs.delete(&key).await;
            step.record(&deleted);
            deleted.map_err(|e| aborted(OPERATION, step.name, e))?;
        }
        Ok(step)
    }

    async fn delete_records(&self, owner: &OwnerId, keys: &EntityKeys) -> StepOutcome {
        let mut step = StepOutcome::new("metadata", StepPolicy::BestEffort);
        let records = match self.catalog.in_entity(owner, &keys.prefix, &keys.path).await {
            Ok(records) => records,
            Err(e) => {
                warn!(entity = %keys.name, error = %e, "Catalog scan failed, skipping record cleanup");
                step.skip(format!("catalog scan failed: {e}"));
                return step;
            }
        };

        let deletes = records
            .iter()
            .map(|record| async move { (record.id, self.catalog.delete(&record.id).await) });
        settle(&mut step, join_all(deletes).await);
        step
    }

    async fn delete_ledger_rows(&self, owner: &OwnerId, keys: &EntityKeys) -> StepOutcome {
        let mut step = StepOutcome::new("ledger", StepPolicy::BestEffort);
        let rows = match self.ledger.for_entity(owner, &keys.name).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(entity = %keys.name, error = %e, "Ledger unavailable, skipping transaction cleanup");
                step.skip(format!("ledger unavailable: {e}"));
                return step;
            }
        };

        let deletes = rows
            .iter()
            .map(|row| async move { (row.id, self.ledger.delete(&row.id).await) });
        settle(&mut step, join_all(deletes).await);
        step
    }
}
