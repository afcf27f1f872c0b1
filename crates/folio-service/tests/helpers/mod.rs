//! Shared test helpers for lifecycle integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use chrono::NaiveDate;

use folio_core::config::AppConfig;
use folio_core::types::OwnerId;
use folio_database::backends::MemoryRecordBackend;
use folio_database::{MetadataCatalog, StatementUploadRepository, TransactionLedger};
use folio_entity::{DriveRecord, StatementUpload, TransactionRecord};
use folio_service::EntityLifecycleManager;
use folio_storage::BlobStorage;
use folio_storage::providers::MemoryBlobStore;

/// Lifecycle manager wired to in-memory stores with fault injection.
pub struct TestHarness {
    /// The manager under test.
    pub manager: EntityLifecycleManager,
    /// Raw blob store, for fault injection and key snapshots.
    pub blob_store: MemoryBlobStore,
    /// Raw record backend shared by every table.
    pub records: MemoryRecordBackend,
    /// Blob adapter over `blob_store`.
    pub storage: BlobStorage,
    /// Catalog over `records`.
    pub catalog: MetadataCatalog,
    /// Ledger over `records`.
    pub ledger: TransactionLedger,
    /// Upload cross-references over `records`.
    pub uploads: StatementUploadRepository,
    /// Configuration the stores were built from.
    pub config: AppConfig,
}

impl TestHarness {
    /// Harness with two-key listing pages so moves cross page boundaries.
    pub fn new() -> Self {
        Self::with_limits(2, 1000)
    }

    /// Harness with an explicit listing page size and scan cap.
    pub fn with_limits(list_page_size: usize, max_scan_items: usize) -> Self {
        let mut config = AppConfig::default();
        config.storage.list_page_size = list_page_size;
        config.records.max_scan_items = max_scan_items;

        let blob_store = MemoryBlobStore::new(list_page_size);
        let records = MemoryRecordBackend::new();
        let storage = BlobStorage::new(Arc::new(blob_store.clone()), &config.storage);
        let catalog = MetadataCatalog::new(Arc::new(records.clone()), &config.records);
        let ledger = TransactionLedger::new(Arc::new(records.clone()), &config.records);
        let uploads = StatementUploadRepository::new(Arc::new(records.clone()), &config.records);

        let manager = EntityLifecycleManager::new(
            storage.clone(),
            catalog.clone(),
            ledger.clone(),
            uploads.clone(),
            &config.lifecycle,
        );

        Self {
            manager,
            blob_store,
            records,
            storage,
            catalog,
            ledger,
            uploads,
            config,
        }
    }

    /// Upload a statement into an existing entity: blob, file record and
    /// upload cross-reference.
    pub async fn upload(&self, owner: &OwnerId, entity: &str, file_name: &str) -> DriveRecord {
        let keys = self.manager.keys(owner, entity);
        let key = format!("{}{file_name}", keys.prefix);
        let body = Bytes::from(format!("statement {file_name}"));
        let size = body.len() as u64;
        self.storage.put(&key, body).await.unwrap();

        let record = DriveRecord::file(
            owner.clone(),
            Some(keys.folder_id),
            file_name,
            format!("{}/{file_name}", keys.path),
            &key,
            size,
        );
        self.catalog.create(&record).await.unwrap();

        let upload = StatementUpload::new(
            owner.clone(),
            Some(record.id),
            self.storage.public_url(&key),
            file_name,
        );
        self.uploads.create(&upload).await.unwrap();
        record
    }

    /// Add `count` ledger rows extracted from `file`.
    pub async fn add_transactions(&self, file: &DriveRecord, entity: &str, count: usize) {
        for i in 0..count {
            let row = TransactionRecord::new(
                file.id,
                file.owner_id.clone(),
                entity,
                NaiveDate::from_ymd_opt(2024, 3, 1 + i as u32).unwrap(),
                format!("Payout {i}"),
                10_000 + i as i64,
                "USD",
            );
            self.ledger.create(&row).await.unwrap();
        }
    }

    /// Every blob key currently stored.
    pub async fn blob_keys(&self) -> Vec<String> {
        self.blob_store.keys().await
    }

    /// Blob keys under `prefix`.
    pub async fn blob_keys_under(&self, prefix: &str) -> Vec<String> {
        self.blob_keys()
            .await
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect()
    }

    /// Every stored upload URL, sorted.
    pub async fn upload_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .uploads
            .referencing("")
            .await
            .unwrap()
            .into_iter()
            .map(|upload| upload.blob_url)
            .collect();
        urls.sort();
        urls
    }
}

/// Parse an owner id.
pub fn owner(raw: &str) -> OwnerId {
    OwnerId::parse(raw).unwrap()
}
