//! Entity RENAME.

use chrono::Utc;
use futures::TryStreamExt;
use futures::future::join_all;
use tracing::{debug, info, warn};

use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::OwnerId;
use folio_entity::drive::{DriveRecord, DriveRecordPatch};

use super::manager::{EntityLifecycleManager, aborted, settle};
use crate::naming::{EntityKeys, normalize_name};
use crate::saga::{SagaReport, StepOutcome, StepPolicy};

const OPERATION: &str = "rename";

impl EntityLifecycleManager {
    /// Rename `owner`'s entity `old_name` to `new_name`.
    ///
    /// Steps, in order:
    ///
    /// 1. collision check (abort): refuse when both the old and the target
    ///    folder records exist under different ids
    /// 2. blob move (abort): copy then delete every key under the old prefix
    /// 3. metadata (best effort): rewrite keys, paths and parent links of
    ///    records under the old prefix
    /// 4. folder record (best effort): rename the entity's own record,
    ///    re-keying it when the derived id changes
    /// 5. cross-references (best effort): rewrite statement-upload URLs
    /// 6. ledger (best effort): file the entity's transaction rows under
    ///    the new name
    ///
    /// The operation succeeds once the blob move completes. It is not
    /// idempotent: a move interrupted half way is not detected on re-run,
    /// though repeating a completed rename finds nothing to move and
    /// returns success.
    pub async fn rename(
        &self,
        owner: &OwnerId,
        old_name: &str,
        new_name: &str,
    ) -> AppResult<SagaReport> {
        let old_name = normalize_name(old_name, "Current entity name")?;
        let new_name = normalize_name(new_name, "New entity name")?;
        let mut report = SagaReport::new(OPERATION);

        if old_name == new_name {
            debug!(owner_id = %owner, entity = %old_name, "Rename to the same name, nothing to do");
            return Ok(report);
        }

        let old = self.keys(owner, &old_name);
        let new = self.keys(owner, &new_name);

        report.push(self.check_rename_target(&old, &new).await?);
        report.push(self.move_blobs(&old, &new).await?);
        report.push(self.rewrite_records(owner, &old, &new).await);
        report.push(self.rewrite_folder_record(&old, &new).await);
        report.push(
            self.rewrite_upload_urls(&old.prefix, |url| {
                url.contains(&old.prefix)
                    .then(|| url.replacen(&old.prefix, &new.prefix, 1))
            })
            .await,
        );
        report.push(self.relabel_ledger_rows(owner, &old, &new).await);

        info!(
            owner_id = %owner,
            from = %old.name,
            to = %new.name,
            failed = report.failed(),
            "Entity renamed"
        );
        Ok(report)
    }

    async fn check_rename_target(&self, old: &EntityKeys, new: &EntityKeys) -> AppResult<StepOutcome> {
        let mut step = StepOutcome::new("collision-check", StepPolicy::Abort);
        if old.folder_id == new.folder_id {
            return Ok(step);
        }

        let target = self.catalog.find_by_id(&new.folder_id).await;
        step.record(&target);
        if target.map_err(|e| aborted(OPERATION, step.name, e))?.is_none() {
            return Ok(step);
        }

        let source = self.catalog.find_by_id(&old.folder_id).await;
        step.record(&source);
        if source.map_err(|e| aborted(OPERATION, step.name, e))?.is_some() {
            return Err(AppError::conflict(format!(
                "Cannot rename '{}' to '{}': an entity with that name already exists",
                old.name, new.name
            )));
        }
        Ok(step)
    }

    async fn move_blobs(&self, old: &EntityKeys, new: &EntityKeys) -> AppResult<StepOutcome> {
        let mut step = StepOutcome::new("move-blobs", StepPolicy::Abort);
        let mut keys = self.blobs.list_by_prefix(&old.prefix);

        while let Some(key) = keys
            .try_next()
            .await
            .map_err(|e| aborted(OPERATION, step.name, e))?
        {
            let Some(dest) = old.rebase_key(&key, new) else {
                continue;
            };
            let moved = self.blobs.move_object(&key, &dest).await;
            step.record(&moved);
            if let Err(e) = moved {
                warn!(key = %key, dest = %dest, moved = step.succeeded, "Blob move failed part way");
                return Err(aborted(OPERATION, step.name, e));
            }
        }

        debug!(from = %old.prefix, to = %new.prefix, moved = step.succeeded, "Blob move phase complete");
        Ok(step)
    }

    async fn rewrite_records(&self, owner: &OwnerId, old: &EntityKeys, new: &EntityKeys) -> StepOutcome {
        let mut step = StepOutcome::new("metadata", StepPolicy::BestEffort);
        let records = match self.catalog.under_prefix(owner, &old.prefix).await {
            Ok(records) => records,
            Err(e) => {
                warn!(prefix = %old.prefix, error = %e, "Catalog scan failed, skipping metadata rewrite");
                step.skip(format!("catalog scan failed: {e}"));
                return step;
            }
        };

        let updates = records
            .into_iter()
            .filter(|record| record.id != old.folder_id)
            .map(|record| {
                let patch = rebase_patch(&record, old, new);
                async move { (record.id, self.catalog.update(&record.id, patch).await) }
            });
        settle(&mut step, join_all(updates).await);
        step
    }

    async fn rewrite_folder_record(&self, old: &EntityKeys, new: &EntityKeys) -> StepOutcome {
        let mut step = StepOutcome::new("folder-record", StepPolicy::BestEffort);
        let found = self.catalog.find_by_id(&old.folder_id).await;
        step.record(&found);

        let folder = match found {
            Ok(Some(folder)) => folder,
            Ok(None) => {
                warn!(folder_id = %old.folder_id, entity = %old.name, "Folder record not found, skipping");
                step.skip("folder record not found");
                return step;
            }
            Err(e) => {
                warn!(folder_id = %old.folder_id, error = %e, "Failed to read folder record");
                return step;
            }
        };

        if old.folder_id == new.folder_id {
            let patch = DriveRecordPatch {
                name: Some(new.name.clone()),
                path: Some(new.path.clone()),
                blob_key: Some(new.prefix.clone()),
                parent_id: None,
            };
            settle(
                &mut step,
                vec![(old.folder_id, self.catalog.update(&old.folder_id, patch).await)],
            );
            return step;
        }

        let replacement = DriveRecord {
            id: new.folder_id,
            name: new.name.clone(),
            path: new.path.clone(),
            blob_key: new.prefix.clone(),
            updated_at: Utc::now(),
            ..folder
        };
        let created = self.catalog.create(&replacement).await;
        let ok = created.is_ok();
        settle(&mut step, vec![(new.folder_id, created)]);
        if ok {
            settle(
                &mut step,
                vec![(old.folder_id, self.catalog.delete(&old.folder_id).await)],
            );
        }
        step
    }

    async fn relabel_ledger_rows(&self, owner: &OwnerId, old: &EntityKeys, new: &EntityKeys) -> StepOutcome {
        let mut step = StepOutcome::new("ledger", StepPolicy::BestEffort);
        let rows = match self.ledger.for_entity(owner, &old.name).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(entity = %old.name, error = %e, "Ledger unavailable, skipping relabel");
                step.skip(format!("ledger unavailable: {e}"));
                return step;
            }
        };

        let updates = rows
            .iter()
            .map(|row| async move { (row.id, self.ledger.relabel(&row.id, &new.name).await) });
        settle(&mut step, join_all(updates).await);
        step
    }

    /// Rewrite statement-upload URLs that contain `fragment`.
    ///
    /// `rewrite` returns the new URL, or `None` to leave an upload alone.
    /// An unreachable upload table skips the step.
    pub(crate) async fn rewrite_upload_urls(
        &self,
        fragment: &str,
        rewrite: impl Fn(&str) -> Option<String>,
    ) -> StepOutcome {
        let mut step = StepOutcome::new("cross-references", StepPolicy::BestEffort);
        let uploads = match self.uploads.referencing(fragment).await {
            Ok(uploads) => uploads,
            Err(e) => {
                warn!(error = %e, "Statement uploads unavailable, skipping URL rewrite");
                step.skip(format!("statement uploads unavailable: {e}"));
                return step;
            }
        };

        let updates = uploads.into_iter().filter_map(|upload| {
            let url = rewrite(&upload.blob_url)?;
            Some(async move { (upload.id, self.uploads.update_url(&upload.id, &url).await) })
        });
        settle(&mut step, join_all(updates).await);
        step
    }
}

/// Field changes that move `record` from `old` to `new`.
fn rebase_patch(record: &DriveRecord, old: &EntityKeys, new: &EntityKeys) -> DriveRecordPatch {
    let relinks_parent =
        old.folder_id != new.folder_id && record.parent_id == Some(old.folder_id);
    DriveRecordPatch {
        name: (record.is_folder() && record.path == old.path).then(|| new.name.clone()),
        path: old.rebase_path(&record.path, new),
        blob_key: old.rebase_key(&record.blob_key, new),
        parent_id: relinks_parent.then_some(new.folder_id),
    }
}
