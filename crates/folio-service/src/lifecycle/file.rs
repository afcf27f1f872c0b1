//! Single-file DELETE-FILE and RENAME-FILE.

use futures::future::join_all;
use tracing::{debug, info, warn};

use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::{OwnerId, RecordId};
use folio_entity::drive::{DriveRecord, DriveRecordPatch};

use super::manager::{EntityLifecycleManager, aborted, settle};
use crate::naming::{normalize_name, sibling};
use crate::saga::{SagaReport, StepOutcome, StepPolicy};

impl EntityLifecycleManager {
    /// Delete one file.
    ///
    /// The blob is deleted before returning; a failure there is logged and
    /// swallowed. Removing the catalog record and the file's ledger rows is
    /// handed to [`DeferredCleanup`](crate::deferred::DeferredCleanup) and
    /// finishes after this call returns, with no retry.
    pub async fn delete_file(&self, owner: &OwnerId, file_id: &RecordId) -> AppResult<SagaReport> {
        let mut report = SagaReport::new("delete-file");
        let record = self.locate_file("delete-file", owner, file_id, &mut report).await?;

        let mut blob = StepOutcome::new("delete-blob", StepPolicy::BestEffort);
        settle(
            &mut blob,
            vec![(record.blob_key.as_str(), self.blobs.delete(&record.blob_key).await)],
        );
        report.push(blob);

        let catalog = self.catalog.clone();
        let ledger = self.ledger.clone();
        let file_id = record.id;
        self.deferred.spawn("delete-file-cleanup", async move {
            if let Err(e) = catalog.delete(&file_id).await {
                warn!(file_id = %file_id, error = %e, "Deferred record delete failed");
            }
            let rows = match ledger.for_file(&file_id).await {
                Ok(rows) => rows,
                Err(e) => {
                    warn!(file_id = %file_id, error = %e, "Deferred ledger scan failed");
                    return;
                }
            };
            let results = join_all(rows.iter().map(|row| ledger.delete(&row.id))).await;
            let failed = results.iter().filter(|r| r.is_err()).count();
            if failed > 0 {
                warn!(file_id = %file_id, failed, "Deferred ledger cleanup left rows behind");
            }
            debug!(file_id = %file_id, rows = rows.len(), "Deferred file cleanup finished");
        });
        report.push(StepOutcome::new("deferred-cleanup", StepPolicy::BestEffort));

        info!(owner_id = %owner, file_id = %file_id, "File deleted; cleanup scheduled");
        Ok(report)
    }

    /// Rename one file within its folder.
    ///
    /// The blob moves to a sibling key first and any failure aborts. The
    /// catalog record and statement-upload URLs are then rewritten on a
    /// best-effort basis. Fails with `Conflict` if the target key exists.
    pub async fn rename_file(
        &self,
        owner: &OwnerId,
        file_id: &RecordId,
        new_name: &str,
    ) -> AppResult<SagaReport> {
        const OPERATION: &str = "rename-file";

        let new_name = normalize_name(new_name, "File name")?;
        let mut report = SagaReport::new(OPERATION);
        let record = self.locate_file(OPERATION, owner, file_id, &mut report).await?;

        let new_key = sibling(&record.blob_key, &new_name);
        if new_key == record.blob_key {
            return Ok(report);
        }

        let mut check = StepOutcome::new("collision-check", StepPolicy::Abort);
        let exists = self.blobs.exists(&new_key).await;
        check.record(&exists);
        if exists.map_err(|e| aborted(OPERATION, check.name, e))? {
            return Err(AppError::conflict(format!(
                "Cannot rename file to '{new_name}': '{new_key}' already exists"
            )));
        }
        report.push(check);

        let mut moved = StepOutcome::new("move-blob", StepPolicy::Abort);
        let result = self.blobs.move_object(&record.blob_key, &new_key).await;
        moved.record(&result);
        result.map_err(|e| aborted(OPERATION, moved.name, e))?;
        report.push(moved);

        let mut metadata = StepOutcome::new("metadata", StepPolicy::BestEffort);
        let patch = DriveRecordPatch {
            name: Some(new_name.clone()),
            path: Some(sibling(&record.path, &new_name)),
            blob_key: Some(new_key.clone()),
            parent_id: None,
        };
        settle(
            &mut metadata,
            vec![(record.id, self.catalog.update(&record.id, patch).await)],
        );
        report.push(metadata);

        let old_suffix = format!("/{}", record.blob_key);
        report.push(
            self.rewrite_upload_urls(&record.blob_key, |url| {
                url.strip_suffix(&old_suffix)
                    .map(|base| format!("{base}/{new_key}"))
            })
            .await,
        );

        info!(
            owner_id = %owner,
            file_id = %record.id,
            from = %record.name,
            to = %new_name,
            "File renamed"
        );
        Ok(report)
    }

    /// Find `owner`'s file record by full scan, failing with `NotFound`.
    async fn locate_file(
        &self,
        operation: &'static str,
        owner: &OwnerId,
        file_id: &RecordId,
        report: &mut SagaReport,
    ) -> AppResult<DriveRecord> {
        let mut step = StepOutcome::new("locate", StepPolicy::Abort);
        let found = self.catalog.find_file(owner, file_id).await;
        step.record(&found);
        let record = found
            .map_err(|e| aborted(operation, step.name, e))?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        report.push(step);
        Ok(record)
    }
}
