//! Lifecycle manager construction, CREATE and LIST.

use std::collections::BTreeSet;
use std::fmt;

use bytes::Bytes;
use tracing::{debug, error, info, warn};

use folio_core::config::lifecycle::LifecycleConfig;
use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::OwnerId;
use folio_database::{MetadataCatalog, StatementUploadRepository, TransactionLedger};
use folio_entity::drive::{DriveRecord, Entity};
use folio_storage::BlobStorage;

use crate::deferred::DeferredCleanup;
use crate::naming::{EntityKeys, normalize_name};
use crate::saga::{SagaReport, StepOutcome, StepPolicy};

/// Orchestrates entity operations across the blob store, the metadata
/// catalog, the transaction ledger and the statement-upload table.
///
/// There is no shared transaction between those stores. Each operation is
/// a saga whose steps either abort on the first failure or carry on and
/// count failures; see [`SagaReport`]. Concurrent operations on the same
/// entity are not serialized.
#[derive(Debug, Clone)]
pub struct EntityLifecycleManager {
    pub(crate) blobs: BlobStorage,
    pub(crate) catalog: MetadataCatalog,
    pub(crate) ledger: TransactionLedger,
    pub(crate) uploads: StatementUploadRepository,
    pub(crate) config: LifecycleConfig,
    pub(crate) deferred: DeferredCleanup,
}

impl EntityLifecycleManager {
    /// Creates a new lifecycle manager.
    pub fn new(
        blobs: BlobStorage,
        catalog: MetadataCatalog,
        ledger: TransactionLedger,
        uploads: StatementUploadRepository,
        config: &LifecycleConfig,
    ) -> Self {
        Self {
            blobs,
            catalog,
            ledger,
            uploads,
            config: config.clone(),
            deferred: DeferredCleanup::new(),
        }
    }

    /// Background cleanup scheduled by DELETE-FILE.
    pub fn deferred(&self) -> &DeferredCleanup {
        &self.deferred
    }

    /// Keys derived for `owner`'s entity `name`.
    pub fn keys(&self, owner: &OwnerId, name: &str) -> EntityKeys {
        EntityKeys::new(&self.config, owner, name)
    }

    /// Create an entity: one folder record plus an empty placeholder blob.
    ///
    /// Fails with `Conflict` when a folder record with the derived id
    /// already exists, which includes names differing only in case or
    /// punctuation.
    pub async fn create(&self, owner: &OwnerId, name: &str) -> AppResult<(Entity, SagaReport)> {
        let name = normalize_name(name, "Entity name")?;
        let keys = self.keys(owner, &name);
        let mut report = SagaReport::new("create");

        let mut check = StepOutcome::new("collision-check", StepPolicy::Abort);
        let existing = self.catalog.find_by_id(&keys.folder_id).await;
        check.record(&existing);
        if let Some(existing) = existing.map_err(|e| aborted("create", check.name, e))? {
            return Err(AppError::conflict(format!(
                "Entity '{name}' collides with existing entity at '{}'",
                existing.path
            )));
        }
        report.push(check);

        let record = DriveRecord::folder(
            keys.folder_id,
            owner.clone(),
            &keys.name,
            &keys.path,
            &keys.prefix,
        );
        let mut folder = StepOutcome::new("folder-record", StepPolicy::Abort);
        let written = self.catalog.create(&record).await;
        folder.record(&written);
        written.map_err(|e| aborted("create", folder.name, e))?;
        report.push(folder);

        let mut placeholder = StepOutcome::new("placeholder", StepPolicy::BestEffort);
        let put = self.blobs.put(&keys.placeholder_key, Bytes::new()).await;
        if let Err(e) = &put {
            warn!(key = %keys.placeholder_key, error = %e, "Failed to write entity placeholder");
        }
        placeholder.record(&put);
        report.push(placeholder);

        info!(
            owner_id = %owner,
            entity = %keys.name,
            folder_id = %keys.folder_id,
            "Entity created"
        );

        let entity = Entity::from_record(&record).ok_or_else(|| {
            AppError::internal(format!("Folder record {} is not an entity", record.id))
        })?;
        Ok((entity, report))
    }

    /// Names of `owner`'s entities, de-duplicated and sorted.
    ///
    /// Only folder records that are direct children of `entities/` count;
    /// the name comes from the path, not the record's name field.
    pub async fn list(&self, owner: &OwnerId) -> AppResult<Vec<String>> {
        let folders = self.catalog.owned_folders(owner).await?;
        let names: BTreeSet<String> = folders
            .iter()
            .filter_map(|record| Entity::name_from_path(&record.path))
            .map(str::to_string)
            .collect();
        debug!(owner_id = %owner, folders = folders.len(), entities = names.len(), "Listed entities");
        Ok(names.into_iter().collect())
    }
}

/// Log an abort-policy step failure and hand the error back.
pub(crate) fn aborted(operation: &'static str, step: &'static str, err: AppError) -> AppError {
    error!(operation, step, error = %err, "Saga step failed; aborting");
    err
}

/// Count fan-out results on a best-effort step, logging each failure.
pub(crate) fn settle<T, I>(step: &mut StepOutcome, results: Vec<(I, AppResult<T>)>)
where
    I: fmt::Display,
{
    for (item, result) in results {
        if let Err(e) = &result {
            warn!(step = step.name, item = %item, error = %e, "Best-effort item failed");
        }
        step.record(&result);
    }
}
